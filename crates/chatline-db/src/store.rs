use async_trait::async_trait;
use chatline_error::AppError;
use chatline_types::{
    metadata_from_value, Message, MessageStatus, MetadataShapeError, UnknownStatus,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("stored metadata is malformed: {0}")]
    Metadata(#[from] MetadataShapeError),

    #[error("stored status is malformed: {0}")]
    Status(#[from] UnknownStatus),
}

impl StoreError {
    fn database(context: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| StoreError::Database { context, source }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Persistence(err.to_string())
    }
}

/// Storage interface for conversations and their messages
///
/// The delivery worker writes through it, the ingress service reads
/// conversation history and checks liveness. Tests substitute an in-memory
/// implementation.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Create the conversation if it does not exist yet
    async fn upsert_conversation(&self, conversation_id: Uuid) -> StoreResult<()>;

    /// Insert a message with all of its fields
    ///
    /// Fails on a duplicate `(conversation_id, message_id)`.
    async fn insert_message(&self, message: &Message) -> StoreResult<()>;

    /// Move a message to `status`.
    ///
    /// Returns the number of rows changed. Zero means no matching row (or a
    /// backwards transition) and is not an error.
    async fn update_status(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
        status: MessageStatus,
    ) -> StoreResult<u64>;

    /// Messages of a conversation, oldest first, at most `limit` of them
    async fn list_messages(&self, conversation_id: Uuid, limit: u32) -> StoreResult<Vec<Message>>;

    /// Cheap round trip used by health checks
    async fn ping(&self) -> StoreResult<()>;
}

/// PostgreSQL implementation of MessageStore
#[derive(Clone)]
pub struct PostgresMessageStore {
    pool: PgPool,
}

impl PostgresMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    conversation_id: Uuid,
    message_id: Uuid,
    from_user: String,
    payload: String,
    status: String,
    metadata: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = StoreError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            conversation_id: row.conversation_id,
            message_id: row.message_id,
            from_user: row.from_user,
            payload: row.payload,
            status: row.status.parse()?,
            metadata: metadata_from_value(row.metadata)?,
            created_at: row.created_at,
        })
    }
}

/// Stored statuses from which a row may be moved to `target`.
///
/// Re-applying the current status is allowed so redelivered records stay
/// idempotent.
fn statuses_leading_to(target: MessageStatus) -> Vec<String> {
    [MessageStatus::Sent, MessageStatus::Delivered]
        .into_iter()
        .filter(|s| *s == target || s.can_transition_to(target))
        .map(|s| s.as_str().to_string())
        .collect()
}

#[async_trait]
impl MessageStore for PostgresMessageStore {
    async fn upsert_conversation(&self, conversation_id: Uuid) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO conversations (id)
            VALUES ($1)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(conversation_id)
        .execute(&self.pool)
        .await
        .map_err(StoreError::database("Failed to upsert conversation"))?;

        Ok(())
    }

    async fn insert_message(&self, message: &Message) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO messages
                (conversation_id, message_id, from_user, payload, status, metadata, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(message.conversation_id)
        .bind(message.message_id)
        .bind(&message.from_user)
        .bind(&message.payload)
        .bind(message.status.as_str())
        .bind(Json(&message.metadata))
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::database("Failed to insert message"))?;

        Ok(())
    }

    async fn update_status(
        &self,
        conversation_id: Uuid,
        message_id: Uuid,
        status: MessageStatus,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET status = $3, updated_at = NOW()
            WHERE conversation_id = $1
              AND message_id = $2
              AND status = ANY($4)
            "#,
        )
        .bind(conversation_id)
        .bind(message_id)
        .bind(status.as_str())
        .bind(statuses_leading_to(status))
        .execute(&self.pool)
        .await
        .map_err(StoreError::database("Failed to update message status"))?;

        Ok(result.rows_affected())
    }

    async fn list_messages(&self, conversation_id: Uuid, limit: u32) -> StoreResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT conversation_id, message_id, from_user, payload, status, metadata, created_at
            FROM messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, message_id ASC
            LIMIT $2
            "#,
        )
        .bind(conversation_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::database("Failed to list messages"))?;

        rows.into_iter().map(Message::try_from).collect()
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::database("Database ping failed"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_guard_never_reverts() {
        assert_eq!(statuses_leading_to(MessageStatus::Delivered), vec!["SENT", "DELIVERED"]);
        assert_eq!(statuses_leading_to(MessageStatus::Sent), vec!["SENT"]);
    }

    #[test]
    fn test_row_decoding() {
        let row = MessageRow {
            conversation_id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            from_user: "alice".into(),
            payload: "hi".into(),
            status: "DELIVERED".into(),
            metadata: None,
            created_at: Utc::now(),
        };
        let msg = Message::try_from(row).unwrap();
        assert_eq!(msg.status, MessageStatus::Delivered);
        assert!(msg.metadata.is_empty());

        let bad = MessageRow {
            conversation_id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            from_user: "alice".into(),
            payload: "hi".into(),
            status: "SENT".into(),
            metadata: Some(json!("oops")),
            created_at: Utc::now(),
        };
        assert!(matches!(Message::try_from(bad), Err(StoreError::Metadata(_))));
    }

    #[test]
    fn test_store_error_maps_to_persistence() {
        let err = StoreError::from(UnknownStatus("LOST".into()));
        assert!(matches!(AppError::from(err), AppError::Persistence(_)));
    }
}
