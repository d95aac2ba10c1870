// ============================================================================
// Chatline Config - Centralized configuration management
// ============================================================================
//
// Configuration for the messaging service and the delivery worker.
// Loaded once from environment variables (and an optional .env file), then
// handed explicitly to every component that needs it.
//
// ============================================================================

mod auth;
mod constants;
mod database;
mod kafka;
mod logging;
mod worker;

pub use auth::AuthConfig;
pub use constants::MAX_LIST_LIMIT;
pub use database::DbConfig;
pub use kafka::{normalize_brokers, KafkaConfig};
pub use logging::{LogFormat, LoggingConfig};
pub use worker::WorkerConfig;

use anyhow::Result;
use constants::*;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure for Chatline services
#[derive(Clone, Debug)]
pub struct Config {
    pub http_port: u16,
    /// Grace period for draining in-flight work on shutdown
    pub shutdown_timeout_secs: u64,
    /// Overall bound on a single ingress publish
    pub publish_timeout_ms: u64,

    // Sub-configurations
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub kafka: KafkaConfig,
    pub db: DbConfig,
    pub worker: WorkerConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            http_port: env_or("HTTP_PORT", DEFAULT_HTTP_PORT),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            publish_timeout_ms: env_or("INGRESS_PUBLISH_TIMEOUT_MS", DEFAULT_PUBLISH_TIMEOUT_MS),
            logging: LoggingConfig::from_env(),
            auth: AuthConfig::from_env(),
            kafka: KafkaConfig::from_env(),
            db: DbConfig::from_env(),
            worker: WorkerConfig::from_env(),
        })
    }

    pub fn http_addr(&self) -> String {
        format!("0.0.0.0:{}", self.http_port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

/// Parse `key` into `T`, falling back to `default` when unset or malformed.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Non-empty string value of `key`, or `default`.
pub(crate) fn env_string(key: &str, default: &str) -> String {
    env_opt(key).unwrap_or_else(|| default.to_string())
}

pub(crate) fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
