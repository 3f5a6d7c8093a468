//! Error types for the contact service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Failures of the message store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store refuses new records.
    #[error("store is full ({capacity} messages)")]
    Full { capacity: usize },

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while handling a request.
///
/// Each variant maps to one HTTP status. Response bodies are generic
/// `{"error": "..."}` payloads; store details are only logged.
#[derive(Debug, Error)]
pub enum ContactError {
    /// The body is not valid JSON.
    #[error("invalid JSON body")]
    InvalidJson,

    /// A required field is missing, not a string, or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// No valid bearer token.
    #[error("unauthorized")]
    Unauthorized,

    /// Too many listing requests in the current window.
    #[error("rate limit exceeded")]
    RateLimited,

    #[error("failed to save message: {0}")]
    Save(#[source] StoreError),

    #[error("failed to fetch messages: {0}")]
    Fetch(#[source] StoreError),
}

impl ContactError {
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidJson | Self::MissingField(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Save(_) | Self::Fetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidJson => "Invalid JSON".to_owned(),
            Self::MissingField(field) => format!("Missing required field: {field}"),
            Self::Unauthorized => "Unauthorized".to_owned(),
            Self::RateLimited => "Too many requests".to_owned(),
            Self::Save(_) => "Failed to save message".to_owned(),
            Self::Fetch(_) => "Failed to fetch messages".to_owned(),
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
