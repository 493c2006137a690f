use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// ApiError
///
/// The application-wide error taxonomy. Every orchestrator maps its storage and
/// logic failures onto the nearest entry here before responding, so the HTTP
/// surface only ever emits one failure shape: `{"error": <message>}` with a
/// status in {400, 401, 403, 404, 500}.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input (400).
    #[error("{0}")]
    Validation(String),

    /// Uniqueness violation on email, isbn, or the one-review-per-book rule (400).
    #[error("{0}")]
    Duplicate(String),

    /// Missing, invalid, or expired session token (401).
    #[error("{0}")]
    Auth(String),

    /// Role or ownership check failed (403).
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity absent (404).
    #[error("{0}")]
    NotFound(String),

    /// Underlying storage failure (500). The sqlx detail is logged, never returned.
    #[error("storage failure")]
    Store(#[from] sqlx::Error),

    /// Catch-all for unexpected internal failures, e.g. a cryptographic
    /// primitive erroring out (500). Detail is logged, never returned.
    #[error("{0}")]
    Internal(String),
}

/// ErrorResponse
///
/// The single JSON body shape used for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Store(err) => {
                // Log the driver-level detail; the client gets a generic message.
                tracing::error!("storage failure: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal storage error".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
