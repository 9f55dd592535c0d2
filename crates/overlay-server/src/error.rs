//! Error types for the HTTP layer.
//!
//! [`ApiError`] is converted into a JSON error response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//! Malformed toggle bodies never reach this type; they are coerced to
//! `on: false` at the boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use overlay_core::HubError;

/// Errors that can occur in the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request was rejected by the core.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<HubError> for ApiError {
    fn from(err: HubError) -> Self {
        match err {
            HubError::EmptyName => Self::BadRequest(err.to_string()),
            HubError::VersionExhausted { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
