use serde::{Deserialize, Serialize};

use super::{ConfigError, Validate};

/// Cache store and connection pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub password: String,
    /// Logical database index
    #[serde(default)]
    pub dbname: i64,
    /// Seconds an idle connection may sit parked before it is discarded on
    /// next acquire. 0 keeps idle connections forever.
    #[serde(default)]
    pub idle_timeout: u64,
    /// Cap on checked-out connections.
    #[serde(default = "default_max_active")]
    pub max_active: usize,
    /// When the pool is saturated, park the caller instead of failing.
    #[serde(default = "default_wait_on_exhaustion")]
    pub wait_on_exhaustion: bool,
    /// Optional deadline in seconds for a parked acquire. Absent by default:
    /// a saturated pool blocks the caller indefinitely.
    #[serde(default)]
    pub acquire_timeout: Option<u64>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_max_active() -> usize {
    29500
}

fn default_wait_on_exhaustion() -> bool {
    true
}

impl RedisConfig {
    /// Connection URL for the driver.
    pub fn url(&self) -> String {
        if self.password.is_empty() {
            format!("redis://{}:{}/{}", self.host, self.port, self.dbname)
        } else {
            format!(
                "redis://:{}@{}:{}/{}",
                urlencoding::encode(&self.password),
                self.host,
                self.port,
                self.dbname,
            )
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            password: String::new(),
            dbname: 0,
            idle_timeout: 0,
            max_active: default_max_active(),
            wait_on_exhaustion: default_wait_on_exhaustion(),
            acquire_timeout: None,
        }
    }
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Validation(
                "redis.host cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::Validation(
                "redis.port must be > 0".to_string(),
            ));
        }
        if self.dbname < 0 {
            return Err(ConfigError::Validation(
                "redis.dbname must be >= 0".to_string(),
            ));
        }
        if self.max_active == 0 {
            return Err(ConfigError::Validation(
                "redis.max_active must be > 0".to_string(),
            ));
        }
        if self.acquire_timeout == Some(0) {
            return Err(ConfigError::Validation(
                "redis.acquire_timeout must be > 0 when set".to_string(),
            ));
        }
        Ok(())
    }
}
