//! # error
//!
//! Centralised application error type.
//!
//! Every handler returns `Result<_, AppError>`.  Axum's `IntoResponse` impl
//! converts these into the same `{ success, error, timestamp }` envelope the
//! successful responses use, so the dashboard always gets a machine-readable
//! body even on failure.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The request was well-formed HTTP but its parameters are not usable
    /// (e.g. a malformed ticker).
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unknown symbol / company / prediction.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller's token bucket is empty.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Catch-all for unexpected failures.
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Unhandled internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success":   false,
            "error":     message,
            "timestamp": Utc::now(),
        }));

        (status, body).into_response()
    }
}
