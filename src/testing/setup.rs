//! Shared fixtures for unit and integration tests.

use sea_orm::{Database, DatabaseConnection, DbErr};

use crate::cache::{CachePool, PoolError, PoolOptions};
use crate::config::TokenConfig;
use crate::testing::connector::MemoryConnector;
use crate::token::TokenCodec;

/// Token configuration with a fixed test secret and the default 30 minute
/// expiry.
pub fn token_config() -> TokenConfig {
    TokenConfig {
        secret: "test-secret-0123456789".to_string(),
        ..TokenConfig::default()
    }
}

/// Codec over [`token_config`].
pub fn codec() -> TokenCodec {
    TokenCodec::new(&token_config())
}

/// In-memory SQLite database; fresh per call for test isolation.
pub async fn database() -> Result<DatabaseConnection, DbErr> {
    Database::connect("sqlite::memory:").await
}

/// Pool over a [`MemoryConnector`] with the given capacity and wait policy.
///
/// The connector handle is returned alongside the pool so tests can count
/// dials and toggle failures.
pub async fn pool(
    max_active: usize,
    wait_on_exhaustion: bool,
) -> Result<(CachePool<MemoryConnector>, MemoryConnector), PoolError> {
    let connector = MemoryConnector::new();
    let options = PoolOptions {
        max_active,
        wait_on_exhaustion,
        ..PoolOptions::default()
    };

    let pool = CachePool::new(connector.clone(), options).await?;

    Ok((pool, connector))
}

#[macro_export]
macro_rules! service {
    () => {{
        let db = $crate::testing::setup::database().await.unwrap();
        let codec = $crate::testing::setup::codec();

        let app = ::actix_web::App::new()
            .app_data(::actix_web::web::Data::new(db.clone()))
            .app_data(::actix_web::web::Data::new(codec))
            .configure($crate::router::route);

        let service = ::actix_web::test::init_service(app).await;

        (service, db)
    }};
}
