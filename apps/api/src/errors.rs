use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// The completion service was unreachable or returned an error.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The model replied, but not with a usable score/recommendation pair.
    #[error("Malformed scoring response: {0}")]
    MalformedScoringResponse(String),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::UnsupportedFileType(kind) => AppError::UnsupportedFileType(kind),
            ExtractError::ExtractionFailed(cause) => AppError::ExtractionFailed(cause),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        AppError::Upstream(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "METHOD_NOT_ALLOWED",
                "Method not allowed".to_string(),
            ),
            AppError::UnsupportedFileType(kind) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FILE_TYPE",
                format!("Unsupported file type: {kind}. Upload a PDF or DOCX resume."),
            ),
            AppError::ExtractionFailed(cause) => {
                tracing::warn!("Resume extraction failed: {cause}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_FAILED",
                    "Failed to read text from the uploaded resume".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Completion service error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    "OpenAI API error".to_string(),
                )
            }
            AppError::MalformedScoringResponse(msg) => {
                tracing::warn!("Rejected scoring response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MALFORMED_SCORING_RESPONSE",
                    "Scoring service did not return a valid score or recommendation".to_string(),
                )
            }
            AppError::S3(msg) => {
                tracing::error!("S3 error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "S3_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
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
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
