use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Open key-value mapping attached to a message.
///
/// Values are arbitrary JSON (string, number, bool, null, array, object).
pub type Metadata = serde_json::Map<String, serde_json::Value>;

// ============================================================================
// MessageStatus - Delivery state machine
// ============================================================================
//
//   SENT ──(persisted by delivery worker)──> DELIVERED
//
// Transitions only move forward. There is no failed state: a message whose
// persistence fails simply never reaches DELIVERED.
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    /// Accepted at ingress and handed to the broker
    #[default]
    Sent,
    /// Persisted by the delivery worker
    Delivered,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Sent => "SENT",
            MessageStatus::Delivered => "DELIVERED",
        }
    }

    fn rank(self) -> u8 {
        match self {
            MessageStatus::Sent => 0,
            MessageStatus::Delivered => 1,
        }
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: MessageStatus) -> bool {
        next.rank() > self.rank()
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SENT" => Ok(MessageStatus::Sent),
            "DELIVERED" => Ok(MessageStatus::Delivered),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown message status: {0}")]
pub struct UnknownStatus(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal status transition {from} -> {to}")]
pub struct StatusTransitionError {
    pub from: MessageStatus,
    pub to: MessageStatus,
}

// ============================================================================
// Message - canonical record carried on the topic and stored in the database
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub conversation_id: Uuid,
    pub message_id: Uuid,
    pub from_user: String,
    pub payload: String,
    pub status: MessageStatus,
    #[serde(default, deserialize_with = "deserialize_metadata")]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Build a fresh message at ingress.
    ///
    /// Assigns a new `message_id`, starts in `SENT` and stamps `created_at`
    /// with the current UTC time at microsecond precision, which is what the
    /// database keeps.
    pub fn new(
        conversation_id: Uuid,
        from_user: impl Into<String>,
        payload: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            conversation_id,
            message_id: Uuid::new_v4(),
            from_user: from_user.into(),
            payload: payload.into(),
            status: MessageStatus::Sent,
            metadata,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn transition_to(&mut self, next: MessageStatus) -> Result<(), StatusTransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(StatusTransitionError {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn mark_delivered(&mut self) -> Result<(), StatusTransitionError> {
        self.transition_to(MessageStatus::Delivered)
    }
}

fn deserialize_metadata<'de, D>(deserializer: D) -> Result<Metadata, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Metadata>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("metadata must be a JSON object, got {0}")]
pub struct MetadataShapeError(pub &'static str);

/// Decode a stored metadata value back into a mapping.
///
/// `None` and JSON `null` both decode to an empty mapping.
pub fn metadata_from_value(
    value: Option<serde_json::Value>,
) -> Result<Metadata, MetadataShapeError> {
    use serde_json::Value;

    match value {
        None | Some(Value::Null) => Ok(Metadata::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(Value::Bool(_)) => Err(MetadataShapeError("bool")),
        Some(Value::Number(_)) => Err(MetadataShapeError("number")),
        Some(Value::String(_)) => Err(MetadataShapeError("string")),
        Some(Value::Array(_)) => Err(MetadataShapeError("array")),
    }
}
