pub mod postgres;
pub mod redis;
pub mod server;
pub mod token;

pub use postgres::PostgresConfig;
pub use redis::RedisConfig;
pub use server::ServerConfig;
pub use token::TokenConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration failure, surfaced at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Read(#[from] ::config::ConfigError),
    #[error("invalid configuration: {0}")]
    Validation(String),
}

/// Startup-time validation for configuration sections.
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Top-level application configuration that aggregates all config modules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener
    #[serde(default)]
    pub server: ServerConfig,
    /// Relational store handle limits
    #[serde(default)]
    pub postgres: PostgresConfig,
    /// Cache store and connection pool limits
    #[serde(default)]
    pub redis: RedisConfig,
    /// Token issuance (secret, expiry, subject)
    #[serde(default)]
    pub token: TokenConfig,
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.postgres.validate()?;
        self.redis.validate()?;
        self.token.validate()?;
        Ok(())
    }
}

/// Load configuration from files and environment variables
///
/// Configuration loading follows this precedence (highest to lowest):
/// 1. Environment variables: TOLLGATE__SERVER__PORT=8080
/// 2. config/local.toml (git-ignored, developer overrides)
/// 3. config/{APP_ENV}.toml (development/staging/production)
/// 4. config/default.toml (base defaults)
pub fn load() -> Result<AppConfig, ConfigError> {
    use config::{Config, Environment, File};

    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", env)).required(false))
        .add_source(File::with_name("config/local").required(false))
        .add_source(Environment::with_prefix("TOLLGATE").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate()?;

    Ok(app_config)
}
