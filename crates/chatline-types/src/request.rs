use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::message::{Message, Metadata};

/// Body of `POST /v1/messages`.
///
/// Missing string fields deserialize as empty so they surface as validation
/// errors rather than body-parse errors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    #[serde(default)]
    pub conversation_id: String,
    #[serde(default)]
    pub from_user: String,
    #[serde(default)]
    pub payload: String,
    #[serde(default)]
    pub metadata: Option<Metadata>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("conversation_id is required")]
    MissingConversationId,
    #[error("conversation_id must be a valid UUID")]
    InvalidConversationId,
    #[error("from_user is required")]
    MissingFromUser,
    #[error("payload is required")]
    MissingPayload,
}

impl CreateMessageRequest {
    /// Validate the request, stopping at the first failure.
    ///
    /// Order: conversation_id present, conversation_id is a UUID, from_user
    /// present, payload present. Returns the parsed conversation id.
    pub fn validate(&self) -> Result<Uuid, ValidationError> {
        if self.conversation_id.is_empty() {
            return Err(ValidationError::MissingConversationId);
        }
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|_| ValidationError::InvalidConversationId)?;
        if self.from_user.is_empty() {
            return Err(ValidationError::MissingFromUser);
        }
        if self.payload.is_empty() {
            return Err(ValidationError::MissingPayload);
        }
        Ok(conversation_id)
    }

    /// Validate and turn the request into a fresh `SENT` message.
    pub fn into_message(self) -> Result<Message, ValidationError> {
        let conversation_id = self.validate()?;
        Ok(Message::new(
            conversation_id,
            self.from_user,
            self.payload,
            self.metadata.unwrap_or_default(),
        ))
    }
}

/// Body returned with `202 Accepted`.
///
/// `conversation_id` echoes the id exactly as the client sent it, casing
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub message_id: Uuid,
    pub conversation_id: String,
    pub status: String,
}

impl SubmitReceipt {
    pub const ACCEPTED: &'static str = "accepted";

    pub fn accepted(message: &Message, submitted_conversation_id: impl Into<String>) -> Self {
        Self {
            message_id: message.message_id,
            conversation_id: submitted_conversation_id.into(),
            status: Self::ACCEPTED.to_string(),
        }
    }
}

/// Body returned by `GET /v1/conversations/{id}/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessages {
    pub conversation_id: Uuid,
    pub messages: Vec<Message>,
}
