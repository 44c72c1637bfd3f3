use anyhow::{Context, Result, ensure};
use async_trait::async_trait;
use redis::Client;
use redis::aio::MultiplexedConnection;

use crate::config::RedisConfig;

/// Dials and probes connections on behalf of a [`CachePool`](super::CachePool).
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Conn: Send + 'static;

    /// Open one new connection to the store.
    async fn connect(&self) -> Result<Self::Conn>;

    /// Lightweight liveness round-trip on an open connection.
    async fn probe(&self, conn: &mut Self::Conn) -> Result<()>;
}

/// Connector backed by a shared `redis::Client`.
pub struct RedisConnector {
    client: Client,
}

impl RedisConnector {
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url()).context("failed to create redis client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Connector for RedisConnector {
    type Conn = MultiplexedConnection;

    async fn connect(&self) -> Result<Self::Conn> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .context("failed to dial redis")
    }

    async fn probe(&self, conn: &mut Self::Conn) -> Result<()> {
        let pong: String = redis::cmd("PING")
            .query_async(conn)
            .await
            .context("redis ping failed")?;

        ensure!(pong == "PONG", "unexpected ping reply: {pong}");
        Ok(())
    }
}
