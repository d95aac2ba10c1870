// ============================================================================
// Ingress Processor
// ============================================================================
//
// Validates a submission, stamps identity (message_id, created_at, SENT),
// serializes it and publishes it keyed by conversation_id. The caller gets
// an answer synchronously: accepted, rejected, or failed. Nothing is retried
// and nothing is persisted here.
//
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use chatline_error::AppError;
use chatline_types::{CreateMessageRequest, SubmitReceipt, ValidationError};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::kafka::{MessagePublisher, TransportError};
use crate::metrics;

#[derive(Debug, Error)]
pub enum IngressError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to publish message: {0}")]
    Publish(#[from] TransportError),
}

impl From<IngressError> for AppError {
    fn from(err: IngressError) -> Self {
        match err {
            IngressError::Validation(e) => AppError::from(e),
            IngressError::Serialization(e) => AppError::Serialization(e.to_string()),
            IngressError::Publish(e) => AppError::Transport(e.to_string()),
        }
    }
}

pub struct IngressProcessor {
    publisher: Arc<dyn MessagePublisher>,
    publish_timeout: Duration,
    shutdown: CancellationToken,
}

impl IngressProcessor {
    /// `publish_timeout` bounds the whole publish, independently of the
    /// transport's own acknowledgement wait. `shutdown` aborts in-flight
    /// publishes.
    pub fn new(
        publisher: Arc<dyn MessagePublisher>,
        publish_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            publisher,
            publish_timeout,
            shutdown,
        }
    }

    pub async fn submit(&self, request: CreateMessageRequest) -> Result<SubmitReceipt, IngressError> {
        let submitted_id = request.conversation_id.clone();
        let message = request.into_message().inspect_err(|e| {
            metrics::MESSAGES_REJECTED_TOTAL.inc();
            warn!(reason = %e, "Rejected message submission");
        })?;

        info!(
            conversation_id = %message.conversation_id,
            message_id = %message.message_id,
            from_user = %message.from_user,
            "Message received"
        );

        let payload = serde_json::to_vec(&message).inspect_err(|e| {
            error!(
                error = %e,
                conversation_id = %message.conversation_id,
                message_id = %message.message_id,
                "Failed to serialize message"
            );
        })?;

        let key = message.conversation_id.to_string();
        let published = tokio::time::timeout(
            self.publish_timeout,
            self.publisher.publish(&key, payload, &self.shutdown),
        )
        .await
        .unwrap_or(Err(TransportError::Timeout));

        match published {
            Ok(receipt) => {
                metrics::MESSAGES_ACCEPTED_TOTAL.inc();
                info!(
                    conversation_id = %message.conversation_id,
                    message_id = %message.message_id,
                    partition = receipt.partition,
                    offset = receipt.offset,
                    "Message published"
                );
                Ok(SubmitReceipt::accepted(&message, submitted_id))
            }
            Err(e) => {
                metrics::MESSAGES_PUBLISH_FAILED_TOTAL.inc();
                error!(
                    error = %e,
                    conversation_id = %message.conversation_id,
                    message_id = %message.message_id,
                    "Failed to publish message"
                );
                Err(IngressError::Publish(e))
            }
        }
    }
}
