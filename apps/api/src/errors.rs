use std::error::Error as _;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::review::extract::InputError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Model credentials are not configured")]
    MissingCredentials,

    #[error("LLM error: {0}")]
    Upstream(LlmError),

    #[error("Model output could not be parsed as a JSON object")]
    UnparseableModelOutput,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingCredentials => AppError::MissingCredentials,
            other => AppError::Upstream(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Input(e) => {
                match e.source() {
                    Some(cause) => tracing::warn!("Rejected submission: {e}: {cause}"),
                    None => tracing::info!("Rejected submission: {e}"),
                }
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            AppError::Validation(msg) => {
                tracing::info!("Validation error: {msg}");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::MissingCredentials => {
                tracing::error!("Model API key is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The review service is not configured".to_string(),
                )
            }
            AppError::Upstream(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The AI review service failed to respond".to_string(),
                )
            }
            AppError::UnparseableModelOutput => {
                tracing::error!("Model output could not be parsed");
                (
                    StatusCode::BAD_GATEWAY,
                    "The AI returned a response that could not be read. Please try again"
                        .to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
