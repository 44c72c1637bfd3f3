use serde::{Deserialize, Serialize};

use super::{ConfigError, Validate};

/// Token issuance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Shared HMAC signing secret
    #[serde(default)]
    pub secret: String,
    /// Token lifetime in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u64,
    /// Subject claim stamped into every issued token
    #[serde(default = "default_subject")]
    pub subject: String,
}

fn default_ttl() -> u64 {
    1800 // 30 minutes
}

fn default_subject() -> String {
    "user".to_string()
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            ttl: default_ttl(),
            subject: default_subject(),
        }
    }
}

impl Validate for TokenConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.is_empty() {
            return Err(ConfigError::Validation(
                "token.secret cannot be empty".to_string(),
            ));
        }
        if self.ttl == 0 {
            return Err(ConfigError::Validation(
                "token.ttl must be > 0".to_string(),
            ));
        }
        if self.subject.is_empty() {
            return Err(ConfigError::Validation(
                "token.subject cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
