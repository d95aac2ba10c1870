// ============================================================================
// Kafka Configuration
// ============================================================================

use std::time::Duration;

use crate::constants::DEFAULT_DELIVERY_ACK_TIMEOUT_MS;
use crate::{env_opt, env_or, env_string};

/// Kafka configuration for the message topic
#[derive(Clone, Debug)]
pub struct KafkaConfig {
    /// Comma-separated list of Kafka brokers (e.g., "kafka1:9092,kafka2:9092")
    pub brokers: String,
    /// Kafka topic name for messages
    pub topic: String,
    /// Consumer group ID for delivery workers
    pub consumer_group: String,
    /// SSL/TLS enabled
    pub ssl_enabled: bool,
    /// SASL mechanism (e.g., "SCRAM-SHA-256", "PLAIN")
    pub sasl_mechanism: Option<String>,
    /// SASL username
    pub sasl_username: Option<String>,
    /// SASL password
    pub sasl_password: Option<String>,
    /// Path to CA certificate file (for self-signed certificates)
    pub ssl_ca_location: Option<String>,
    // producer-specific settings
    pub producer_compression: String, // "zstd" | "snappy" | "gzip" | "lz4" | "none"
    pub producer_acks: String,        // "all" | "1" | "-1" | "0"
    pub producer_linger_ms: u32,
    pub producer_enable_idempotence: bool,
    /// How long a publish waits for its delivery report
    pub delivery_ack_timeout_ms: u64,
}

impl KafkaConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            brokers: normalize_brokers(
                &env_string("KAFKA_BROKERS", "localhost:9092"),
                "localhost:9092",
            ),
            topic: env_string("KAFKA_TOPIC", "messages"),
            consumer_group: env_string("KAFKA_CONSUMER_GROUP", "chatline-delivery-workers"),
            ssl_enabled: env_or("KAFKA_SSL_ENABLED", false),
            sasl_mechanism: env_opt("KAFKA_SASL_MECHANISM"),
            sasl_username: env_opt("KAFKA_SASL_USERNAME"),
            sasl_password: env_opt("KAFKA_SASL_PASSWORD"),
            ssl_ca_location: env_opt("KAFKA_SSL_CA_LOCATION"),
            producer_compression: env_string("KAFKA_PRODUCER_COMPRESSION", "snappy"),
            producer_acks: env_string("KAFKA_PRODUCER_ACKS", "all"),
            producer_linger_ms: env_or("KAFKA_PRODUCER_LINGER_MS", 10),
            producer_enable_idempotence: env_or("KAFKA_PRODUCER_ENABLE_IDEMPOTENCE", true),
            delivery_ack_timeout_ms: env_or(
                "KAFKA_DELIVERY_ACK_TIMEOUT_MS",
                DEFAULT_DELIVERY_ACK_TIMEOUT_MS,
            ),
        }
    }

    pub fn delivery_ack_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_ack_timeout_ms)
    }
}

/// Trim each broker address and drop empty entries.
///
/// Falls back to `default` when nothing usable is left.
pub fn normalize_brokers(raw: &str, default: &str) -> String {
    let brokers: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();
    if brokers.is_empty() {
        default.to_string()
    } else {
        brokers.join(",")
    }
}
