//! Error types for the lookup API.
//!
//! [`ApiError`] covers every client-facing failure and converts into an
//! Axum response with a `{"detail": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hardness_core::ResolveError;

/// Message returned when no resolution tier produced a reading.
pub const NO_FALLBACK_DETAIL: &str = "No fallback available";

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The postal code could not be resolved.
    #[error("lookup failed: {0}")]
    Unresolved(#[from] ResolveError),

    /// A required query parameter was not supplied.
    #[error("missing required query parameter: {0}")]
    MissingParameter(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::Unresolved(_) => (StatusCode::NOT_FOUND, NO_FALLBACK_DETAIL.to_owned()),
            Self::MissingParameter(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
        };

        let body = serde_json::json!({ "detail": detail });

        (status, axum::Json(body)).into_response()
    }
}
