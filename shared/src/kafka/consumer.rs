use anyhow::{Context, Result};
use async_trait::async_trait;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::{Message, Offset, TopicPartitionList};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::config::create_client_config;
use super::metrics;
use super::{RecordSource, TransportError, TransportRecord};
use chatline_config::KafkaConfig;

/// Kafka consumer for the delivery worker
///
/// Offsets are committed in the background (`enable.auto.commit=true`) but
/// only stored once a record has been handled
/// (`enable.auto.offset.store=false`), so a crash replays unhandled records.
pub struct MessageConsumer {
    consumer: StreamConsumer,
}

impl MessageConsumer {
    /// Create the consumer and subscribe to the message topic.
    ///
    /// - `auto.offset.reset=earliest`: read from the beginning on first start
    /// - `session.timeout.ms=30000`, `heartbeat.interval.ms=3000`
    pub fn new(config: &KafkaConfig) -> Result<Self> {
        info!("Initializing Kafka consumer...");
        let mut client_config = create_client_config(config)?;

        let consumer: StreamConsumer = client_config
            .set("group.id", &config.consumer_group)
            .set("enable.auto.commit", "true")
            .set("enable.auto.offset.store", "false")
            .set("auto.offset.reset", "earliest")
            .set("allow.auto.create.topics", "true")
            .set("session.timeout.ms", "30000")
            .set("heartbeat.interval.ms", "3000")
            .set("max.poll.interval.ms", "300000")
            .create()
            .context("Failed to create Kafka consumer")?;

        consumer
            .subscribe(&[&config.topic])
            .context("Failed to subscribe to Kafka topic")?;

        info!(
            topic = %config.topic,
            group = %config.consumer_group,
            "Kafka consumer initialized"
        );

        Ok(Self { consumer })
    }
}

#[async_trait]
impl RecordSource for MessageConsumer {
    async fn read(
        &self,
        wait: Duration,
        cancel: &CancellationToken,
    ) -> Result<Option<TransportRecord>, TransportError> {
        if cancel.is_cancelled() {
            return Err(TransportError::Cancelled);
        }

        tokio::select! {
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            _ = tokio::time::sleep(wait) => Ok(None),
            received = self.consumer.recv() => match received {
                Ok(message) => {
                    metrics::KAFKA_CONSUME_SUCCESS.inc();
                    Ok(Some(TransportRecord {
                        topic: message.topic().to_string(),
                        partition: message.partition(),
                        offset: message.offset(),
                        key: message
                            .key()
                            .map(|k| String::from_utf8_lossy(k).into_owned()),
                        payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
                    }))
                }
                Err(KafkaError::PartitionEOF(_)) => Ok(None),
                Err(err) => {
                    metrics::KAFKA_CONSUME_FAILURE.inc();
                    Err(TransportError::Read(err.to_string()))
                }
            },
        }
    }

    fn acknowledge(&self, record: &TransportRecord) -> Result<(), TransportError> {
        // The stored offset is the next one to read
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &record.topic,
            record.partition,
            Offset::Offset(record.offset + 1),
        )
        .map_err(|e| TransportError::Offset(e.to_string()))?;

        self.consumer
            .store_offsets(&tpl)
            .map_err(|e| TransportError::Offset(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn unreachable_config() -> KafkaConfig {
        KafkaConfig {
            brokers: "127.0.0.1:1".to_string(),
            topic: "messages".to_string(),
            consumer_group: "test-group".to_string(),
            ssl_enabled: false,
            sasl_mechanism: None,
            sasl_username: None,
            sasl_password: None,
            ssl_ca_location: None,
            producer_compression: "none".to_string(),
            producer_acks: "all".to_string(),
            producer_linger_ms: 0,
            producer_enable_idempotence: false,
            delivery_ack_timeout_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn test_read_with_cancelled_token_returns_immediately() {
        let consumer = MessageConsumer::new(&unreachable_config()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let start = Instant::now();
        let result = consumer.read(Duration::from_secs(30), &cancel).await;

        assert!(matches!(result, Err(TransportError::Cancelled)));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
