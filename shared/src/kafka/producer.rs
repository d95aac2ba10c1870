use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::create_client_config;
use super::metrics;
use super::{DeliveryReceipt, MessagePublisher, TransportError};
use chatline_config::KafkaConfig;

/// Kafka producer for the message topic
///
/// Configured for:
/// - `acks=all` and idempotent writes
/// - Compression and a short linger window
/// - One delivery report awaited per publish, bounded by
///   `delivery_ack_timeout`
#[derive(Clone)]
pub struct MessageProducer {
    producer: FutureProducer,
    topic: String,
    ack_timeout: Duration,
}

impl MessageProducer {
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        info!("Initializing Kafka producer...");
        let mut client_config = create_client_config(config)?;

        let producer: FutureProducer = client_config
            .set("acks", &config.producer_acks)
            .set(
                "enable.idempotence",
                if config.producer_enable_idempotence {
                    "true"
                } else {
                    "false"
                },
            )
            .set("compression.type", &config.producer_compression)
            .set("linger.ms", config.producer_linger_ms.to_string())
            .set(
                "message.timeout.ms",
                config.delivery_ack_timeout_ms.to_string(),
            )
            .create()
            .context("Failed to create Kafka producer")?;

        info!(topic = %config.topic, "Kafka producer initialized");

        Ok(Self {
            producer,
            topic: config.topic.clone(),
            ack_timeout: config.delivery_ack_timeout(),
        })
    }

    /// Flush in-flight records before shutdown.
    ///
    /// Blocks the calling thread for up to `timeout`.
    pub fn flush(&self, timeout: Duration) -> Result<()> {
        info!(timeout_ms = timeout.as_millis(), "Flushing Kafka producer");
        self.producer
            .flush(Timeout::After(timeout))
            .context("Failed to flush Kafka producer")?;
        info!("Kafka producer flushed");
        Ok(())
    }
}

#[async_trait]
impl MessagePublisher for MessageProducer {
    async fn publish(
        &self,
        key: &str,
        payload: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Result<DeliveryReceipt, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        let start = Instant::now();
        let record = FutureRecord::to(&self.topic).key(key).payload(&payload);

        let delivery = self.producer.send_result(record).map_err(|(err, _)| {
            metrics::KAFKA_PRODUCE_FAILURE.inc();
            error!(error = %err, topic = %self.topic, "Failed to enqueue Kafka record");
            TransportError::Enqueue(err.to_string())
        })?;

        let report = tokio::select! {
            report = delivery => report,
            _ = tokio::time::sleep(self.ack_timeout) => {
                metrics::KAFKA_PRODUCE_FAILURE.inc();
                warn!(
                    topic = %self.topic,
                    timeout_ms = self.ack_timeout.as_millis(),
                    "Timed out waiting for Kafka delivery report"
                );
                return Err(TransportError::Timeout);
            }
            _ = cancel.cancelled() => {
                debug!(topic = %self.topic, "Publish cancelled while awaiting delivery report");
                return Err(TransportError::Cancelled);
            }
        };

        match report {
            Ok(Ok((partition, offset))) => {
                let latency = start.elapsed();
                metrics::KAFKA_PRODUCE_SUCCESS.inc();
                metrics::KAFKA_PRODUCE_LATENCY.observe(latency.as_secs_f64());
                debug!(
                    partition = partition,
                    offset = offset,
                    latency_ms = latency.as_millis(),
                    "Kafka delivery acknowledged"
                );
                Ok(DeliveryReceipt { partition, offset })
            }
            Ok(Err((err, _))) => {
                metrics::KAFKA_PRODUCE_FAILURE.inc();
                error!(error = %err, topic = %self.topic, "Kafka delivery failed");
                Err(TransportError::Delivery(err.to_string()))
            }
            Err(_) => {
                metrics::KAFKA_PRODUCE_FAILURE.inc();
                Err(TransportError::Delivery(
                    "delivery report channel closed".to_string(),
                ))
            }
        }
    }
}
