use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::interview::transcript::EmptyMessage;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// An action that the current interview phase does not allow.
    #[error("Invalid state: {0}")]
    StateInvariant(String),

    /// Missing completion-service settings. Raised while building the client at
    /// startup; no request handler produces it.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Completion service error: {0}")]
    Upstream(#[source] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::MissingCredential => AppError::Configuration(e.to_string()),
            other => AppError::Upstream(other),
        }
    }
}

impl From<EmptyMessage> for AppError {
    fn from(e: EmptyMessage) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::StateInvariant(msg) => {
                tracing::warn!("Rejected out-of-phase action: {msg}");
                (StatusCode::CONFLICT, "INVALID_STATE", msg.clone())
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIGURATION_ERROR",
                    "The assessment service is not configured".to_string(),
                )
            }
            AppError::Upstream(LlmError::Timeout(after)) => {
                tracing::error!("Completion call timed out after {after:?}");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "UPSTREAM_TIMEOUT",
                    "The assistant took too long to respond, please try again".to_string(),
                )
            }
            AppError::Upstream(e) => {
                tracing::error!("Completion error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The assistant is unavailable right now, please try again".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
