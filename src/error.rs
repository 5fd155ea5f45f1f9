//! Errors surfaced by HTTP handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::contact::ContactError;

/// Handler-level failures.
///
/// Validation problems are not errors at this level: a rejected contact form
/// is a normal response that renders its inline message.
#[derive(Debug, Error)]
pub enum AppError {
    /// The visitor ID is unknown, usually because the session expired.
    #[error("Session {0} not found. Reload the page to start over.")]
    SessionNotFound(String),

    /// A form body the contact form cannot apply, such as an unknown field.
    #[error(transparent)]
    InvalidForm(#[from] ContactError),
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::SessionNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidForm(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::debug!(name: "request.failed", error = %self, "Request failed");
        (self.status(), self.to_string()).into_response()
    }
}
