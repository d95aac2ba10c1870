// ============================================================================
// Record Processor
// ============================================================================
//
// Turns one consumed record into durable state:
// 1. Decode the record into a Message (timestamps normalized to UTC)
// 2. Create the conversation if needed, then insert the message as SENT
// 3. Move it to DELIVERED
//
// A failure in 1 or 2 abandons the record. The caller logs it and still
// advances past it; there is no retry and no dead-letter topic.
//
// ============================================================================

use chatline_db::StoreError;
use chatline_types::{Message, StatusTransitionError};
use thiserror::Error;
use tracing::{info, warn};

use crate::delivery_worker::state::WorkerState;
use crate::kafka::TransportRecord;

/// Outcome of a record that was persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// Inserted and moved to DELIVERED
    Delivered,
    /// Inserted, but the status update matched no row
    StatusNotApplied,
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to decode record: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("record carries a non-initial status: {0}")]
    Transition(#[from] StatusTransitionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Decode a record payload into a message.
pub fn decode_record(record: &TransportRecord) -> Result<Message, ProcessError> {
    // chrono parses any RFC 3339 offset into DateTime<Utc>
    Ok(serde_json::from_slice(&record.payload)?)
}

/// Persist one record and mark it delivered
pub async fn process_record(
    state: &WorkerState,
    record: &TransportRecord,
) -> Result<ProcessResult, ProcessError> {
    let message = decode_record(record)?;

    // Only SENT records can be delivered; check before touching the store
    let mut delivered = message.clone();
    delivered.mark_delivered()?;

    state.store.upsert_conversation(message.conversation_id).await?;
    state.store.insert_message(&message).await?;

    let updated = state
        .store
        .update_status(message.conversation_id, message.message_id, delivered.status)
        .await?;

    if updated == 0 {
        warn!(
            conversation_id = %message.conversation_id,
            message_id = %message.message_id,
            "Status update matched no row"
        );
        return Ok(ProcessResult::StatusNotApplied);
    }

    info!(
        conversation_id = %message.conversation_id,
        message_id = %message.message_id,
        "Message delivered"
    );
    Ok(ProcessResult::Delivered)
}
