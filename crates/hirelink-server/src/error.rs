//! Error types for the Hirelink server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Application error type.
///
/// Service-layer code returns these; the `IntoResponse` impl maps them to
/// an HTTP status and the uniform response envelope. Database and internal
/// errors are logged and masked behind a generic message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("Invalid hold state: {0}")]
    InvalidHoldState(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error code carried in the response envelope.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "INTERNAL_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InsufficientBalance(_) => "INSUFFICIENT_BALANCE",
            AppError::InvalidHoldState(_) => "INVALID_HOLD_STATE",
            AppError::Authorization(_) => "AUTHORIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::InsufficientBalance(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidHoldState(_) => StatusCode::CONFLICT,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "error": message,
            "errorCode": self.error_code(),
        });

        (self.status_code(), Json(body)).into_response()
    }
}
