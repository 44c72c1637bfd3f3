//! Unit tests for configuration loading
//!
//! Covers loading defaults from config/default.toml, environment variable
//! precedence and validation of the merged configuration.

use serial_test::serial;
use std::env;
use tollgate::config::{self, RedisConfig, TokenConfig, Validate};

mod utils {
    /// Clean up environment variables with the TOLLGATE prefix
    pub fn clean_env_vars() {
        let keys: Vec<String> = std::env::vars()
            .filter(|(k, _)| k.starts_with("TOLLGATE"))
            .map(|(k, _)| k)
            .collect();

        for key in keys {
            unsafe { std::env::remove_var(&key) };
        }
    }
}

#[tokio::test]
#[serial]
async fn load_default_config_success() {
    utils::clean_env_vars();
    unsafe { env::remove_var("APP_ENV") };

    let config = config::load();
    assert!(config.is_ok(), "failed to load defaults: {:?}", config.err());

    let config = config.unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);

    assert_eq!(config.postgres.host, "127.0.0.1");
    assert_eq!(config.postgres.port, 5432);
    assert_eq!(config.postgres.max_connect, 10);

    assert_eq!(config.redis.host, "127.0.0.1");
    assert_eq!(config.redis.port, 6379);
    assert_eq!(config.redis.dbname, 0);
    assert_eq!(config.redis.idle_timeout, 240);
    assert_eq!(config.redis.max_active, 29500);
    assert!(config.redis.wait_on_exhaustion);
    assert_eq!(config.redis.acquire_timeout, None);

    assert!(!config.token.secret.is_empty());
    assert_eq!(config.token.ttl, 1800);
    assert_eq!(config.token.subject, "user");
}

#[tokio::test]
#[serial]
async fn environment_variables_override_files() {
    utils::clean_env_vars();
    unsafe {
        env::remove_var("APP_ENV");
        env::set_var("TOLLGATE__SERVER__PORT", "9090");
        env::set_var("TOLLGATE__REDIS__MAX_ACTIVE", "5");
        env::set_var("TOLLGATE__TOKEN__SECRET", "env-secret");
    }

    let config = config::load().unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.redis.max_active, 5);
    assert_eq!(config.token.secret, "env-secret");

    utils::clean_env_vars();
}

#[tokio::test]
#[serial]
async fn invalid_override_fails_validation() {
    utils::clean_env_vars();
    unsafe {
        env::remove_var("APP_ENV");
        env::set_var("TOLLGATE__POSTGRES__MAX_CONNECT", "0");
    }

    assert!(config::load().is_err());

    utils::clean_env_vars();
}

#[test]
fn redis_validation_rejects_zero_capacity() {
    let config = RedisConfig {
        max_active: 0,
        ..RedisConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn token_validation_requires_secret_and_ttl() {
    assert!(TokenConfig::default().validate().is_err());

    let config = TokenConfig {
        secret: "k".to_string(),
        ttl: 0,
        ..TokenConfig::default()
    };
    assert!(config.validate().is_err());

    let config = TokenConfig {
        secret: "k".to_string(),
        ..TokenConfig::default()
    };
    assert!(config.validate().is_ok());
}
