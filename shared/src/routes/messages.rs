// ============================================================================
// Message Routes
// ============================================================================
//
// - POST /v1/messages - Validate, publish, answer 202 with the new message_id
// - GET /v1/conversations/:id/messages - Conversation history, oldest first
//
// ============================================================================

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chatline_config::MAX_LIST_LIMIT;
use chatline_error::AppError;
use chatline_types::{ConversationMessages, CreateMessageRequest, ValidationError};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::context::AppContext;

#[derive(Debug, Default, Deserialize)]
pub struct ListMessagesQuery {
    pub limit: Option<u32>,
}

impl ListMessagesQuery {
    /// Requested limit clamped to `1..=MAX_LIST_LIMIT`, defaulting to the max.
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(MAX_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
    }
}

/// POST /v1/messages
pub async fn create_message(
    State(app_context): State<Arc<AppContext>>,
    body: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        AppError::validation("invalid request body")
    })?;

    let receipt = app_context.ingress.submit(request).await?;
    Ok((StatusCode::ACCEPTED, Json(receipt)))
}

/// GET /v1/conversations/:id/messages
pub async fn list_messages(
    State(app_context): State<Arc<AppContext>>,
    Path(conversation_id): Path<String>,
    query: Result<Query<ListMessagesQuery>, QueryRejection>,
) -> Result<Json<ConversationMessages>, AppError> {
    let conversation_id = conversation_id.trim();
    if conversation_id.is_empty() {
        return Err(ValidationError::MissingConversationId.into());
    }
    let conversation_id =
        Uuid::parse_str(conversation_id).map_err(|_| ValidationError::InvalidConversationId)?;

    let Query(query) =
        query.map_err(|_| AppError::validation("limit must be a non-negative integer"))?;

    let messages = app_context
        .store
        .list_messages(conversation_id, query.effective_limit())
        .await?;

    Ok(Json(ConversationMessages {
        conversation_id,
        messages,
    }))
}
