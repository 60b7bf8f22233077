//! Error types for the Observer API server.
//!
//! [`ObserverError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use trinetra_core::CommandError;

/// Errors that can occur in the Observer API layer.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The request body or path could not be understood.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An operator command was rejected.
    #[error(transparent)]
    Command(#[from] CommandError),
}

impl ObserverError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) | Self::Command(CommandError::UnknownThreat { .. }) => {
                StatusCode::NOT_FOUND
            }
            Self::BadRequest(_) | Self::Command(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::NotFound(msg) | Self::BadRequest(msg) => msg.clone(),
            Self::Command(e) => e.to_string(),
        };

        tracing::debug!(status = status.as_u16(), error = %message, "Request rejected");

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
