// Kafka module for the message topic
//
// Producer and consumer wrappers around rdkafka, plus the two seams the
// processors are written against. Records are keyed by conversation_id so a
// conversation always lands on one partition.

pub mod config;
pub mod consumer;
pub mod metrics;
pub mod producer;

pub use config::create_client_config;
pub use consumer::MessageConsumer;
pub use producer::MessageProducer;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Where a published record ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub partition: i32,
    pub offset: i64,
}

/// A record read from the topic, detached from the client that read it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRecord {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub key: Option<String>,
    pub payload: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to enqueue record: {0}")]
    Enqueue(String),

    #[error("delivery failed: {0}")]
    Delivery(String),

    #[error("timed out waiting for delivery acknowledgement")]
    Timeout,

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to read from topic: {0}")]
    Read(String),

    #[error("failed to store offset: {0}")]
    Offset(String),
}

/// Publishing side of the topic
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    /// Publish one keyed record and wait for its delivery acknowledgement.
    ///
    /// Fails with `Delivery` when the broker reports an error, `Timeout` when
    /// no acknowledgement arrives in time, and `Cancelled` when `cancel`
    /// fires first.
    async fn publish(
        &self,
        key: &str,
        payload: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<DeliveryReceipt, TransportError>;
}

/// Consuming side of the topic
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Wait up to `wait` for the next record.
    ///
    /// `Ok(None)` means nothing arrived in the window. Returns `Cancelled`
    /// right away if `cancel` is already set.
    async fn read(
        &self,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<TransportRecord>, TransportError>;

    /// Mark `record` as handled so its offset is committed.
    fn acknowledge(&self, record: &TransportRecord) -> Result<(), TransportError>;
}
