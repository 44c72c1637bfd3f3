//! Shared handle to the relational store.
//!
//! There is no pool-of-connections abstraction here: the driver-level limits
//! bound concurrency, and a connection past the lifetime cap is recycled on
//! next use rather than actively killed.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use thiserror::Error;

use crate::config::PostgresConfig;

/// Connections older than this are discarded on next use.
const CONN_MAX_LIFETIME: Duration = Duration::from_secs(50);

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("failed to open database connection: {0}")]
    Open(#[source] DbErr),
    #[error("database ping failed: {0}")]
    Ping(#[source] DbErr),
}

/// Open the shared database handle and verify liveness.
///
/// Max-open and max-idle connection counts are both pinned to `max_connect`.
/// The ping is mandatory: on failure the handle is not considered established
/// and the error is returned to the caller.
pub async fn connect(config: &PostgresConfig) -> Result<DatabaseConnection, ConnectError> {
    let mut options = ConnectOptions::new(config.url());
    options
        .max_connections(config.max_connect)
        .min_connections(config.max_connect)
        .max_lifetime(CONN_MAX_LIFETIME)
        .sqlx_logging(false);

    let db = Database::connect(options).await.map_err(ConnectError::Open)?;

    db.ping().await.map_err(ConnectError::Ping)?;

    Ok(db)
}
