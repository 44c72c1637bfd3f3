#![deny(warnings)]

pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod logging;
pub mod router;
pub mod token;

// Testing utilities (always available for integration tests)
pub mod testing;

// Re-export commonly used types for convenience
pub use cache::{CachePool, Connector, PoolError, PoolOptions, PooledConnection, RedisConnector, RedisPool};
pub use database::ConnectError;
pub use token::{AccessClaims, TokenCodec, TokenError, Verification};
