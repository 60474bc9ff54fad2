use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use ylink_core::HandoffError;

use crate::content::ContentError;

/// Errors returned by HTTP handlers, rendered as `{"error", "code"}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, invalid or expired session, or a pilot without access.
    #[error("Unauthorized")]
    Unauthorized,

    /// A planner or patch-sheet handoff that could not be decoded.
    #[error("Invalid import: {0}")]
    Handoff(#[from] HandoffError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized".to_string(),
            ),
            AppError::Handoff(err) => (StatusCode::BAD_REQUEST, "INVALID_IMPORT", err.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Content(err) => {
                log::error!("Content error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                log::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
