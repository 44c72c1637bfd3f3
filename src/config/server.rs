use serde::{Deserialize, Serialize};

use super::{ConfigError, Validate};

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Validation(
                "server.host cannot be empty".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::Validation(
                "server.port must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
