//! Bounded connection pooling for the cache store.

pub mod connector;
pub mod pool;

pub use connector::{Connector, RedisConnector};
pub use pool::{CachePool, PoolError, PoolOptions, PoolStats, PooledConnection};

use crate::config::RedisConfig;

/// Pool over real Redis connections; the shape the rest of the service uses.
pub type RedisPool = CachePool<RedisConnector>;

impl CachePool<RedisConnector> {
    /// Dial Redis per `config` and construct the pool, probing eagerly.
    pub async fn connect(config: &RedisConfig) -> Result<Self, PoolError> {
        let connector = RedisConnector::new(config).map_err(PoolError::Dial)?;

        Self::new(connector, PoolOptions::from(config)).await
    }
}
