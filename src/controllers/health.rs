//! Health check endpoints
//!
//! Provides endpoints for monitoring service health and backing store
//! connectivity.

use actix_web::get;
use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, Responder};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::cache::RedisPool;

/// Liveness health check response (simple)
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessResponse {
    /// Service status
    pub status: String,
    /// Timestamp of the check
    pub timestamp: DateTime<Utc>,
}

/// Backing store health check response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealthResponse {
    /// Service status
    pub status: String,
    /// Application version
    pub version: String,
    /// The store that was checked
    pub store: String,
    /// Store connectivity status
    pub connection: String,
}

/// Liveness check endpoint
///
/// Always returns 200 OK while the service is running; no dependencies are
/// consulted.
#[get("/health")]
pub async fn health() -> impl Responder {
    let response = LivenessResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    };

    ::tracing::debug!("Liveness check: healthy");
    Json(response)
}

/// Database connectivity check
#[get("/health/db")]
pub async fn health_db(db: Data<DatabaseConnection>) -> impl Responder {
    let connected = db.ping().await.is_ok();

    store_response("database", connected)
}

/// Cache connectivity check
///
/// Borrows a pooled connection and runs the liveness probe on it.
#[get("/health/cache")]
pub async fn health_cache(pool: Data<RedisPool>) -> impl Responder {
    let connected = match pool.acquire().await {
        Ok(mut conn) => pool.probe(&mut conn).await.is_ok(),
        Err(e) => {
            ::tracing::warn!(error = %e, "cache health check failed to acquire");
            false
        }
    };

    store_response("cache", connected)
}

fn store_response(store: &str, connected: bool) -> HttpResponse {
    let response = StoreHealthResponse {
        status: if connected { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store.to_string(),
        connection: if connected { "connected" } else { "disconnected" }.to_string(),
    };

    if connected {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
