use axum::{http::StatusCode, response::IntoResponse};
use chatline_types::ValidationError;
use serde_json::json;
use thiserror::Error;

/// Application error type returned by HTTP handlers
///
/// Each variant maps to a status code, a stable error code and a message
/// that is safe to show to clients. Server-side variants keep their detail
/// for logs only.
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Client Errors =====
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    // ===== Pipeline Errors =====
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ===== Operational Errors =====
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Transport(_) | AppError::Persistence(_) | AppError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get a client-facing message (without internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Auth(_) => "unauthorized".to_string(),
            AppError::Transport(_) => "failed to publish message".to_string(),
            AppError::Persistence(_) => "failed to fetch messages".to_string(),
            AppError::Serialization(_) => "failed to serialize message".to_string(),
            AppError::Unavailable(_) => "service unavailable".to_string(),
        }
    }

    /// Get error code for programmatic error handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Auth(_) => "AUTH_ERROR",
            AppError::Transport(_) => "TRANSPORT_ERROR",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Unavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Log this error with appropriate level and context
    pub fn log(&self) {
        let status = self.status_code();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error = %self,
                error_code = %code,
                status = %status.as_u16(),
                "Server error occurred"
            );
        } else if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(error = %self, error_code = %code, "Authentication failed");
        } else {
            tracing::debug!(error = %self, error_code = %code, "Client error occurred");
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        self.log();

        let status = self.status_code();
        let body = json!({
            "error": self.user_message(),
            "error_code": self.error_code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
