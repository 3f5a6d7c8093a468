//! Contact form backend: accepts submissions and lists them to admins.
//!
//! - `POST /api/contact` validates and stores a `{name, email, message}`
//!   submission.
//! - `GET /api/messages` returns stored messages newest first, behind a
//!   bearer token and a per-identity rate limit.

pub mod auth;
pub mod config;
pub mod error;
pub mod rate_limit;
pub mod store;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

pub use auth::{AdminAuth, Identity};
pub use error::{ContactError, StoreError};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use store::{ContactMessage, InMemoryStore, MessageStore, NewMessage};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MessageStore>,
    pub limiter: Arc<RateLimiter>,
    pub auth: Arc<AdminAuth>,
}

impl AppState {
    pub fn new(store: Arc<dyn MessageStore>, limiter: RateLimiter, auth: AdminAuth) -> Self {
        Self {
            store,
            limiter: Arc::new(limiter),
            auth: Arc::new(auth),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/contact", post(submit_contact))
        .route("/api/messages", get(list_messages))
        .with_state(state)
}

/// Checks a raw request body and extracts the trimmed fields.
///
/// # Errors
///
/// `InvalidJson` for unparsable bodies, `MissingField` for the first
/// required field that is absent, not a string, or blank.
pub fn parse_submission(body: &[u8]) -> Result<NewMessage, ContactError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ContactError::InvalidJson)?;

    Ok(NewMessage {
        name: required(&value, "name")?,
        email: required(&value, "email")?,
        message: required(&value, "message")?,
    })
}

fn required(value: &Value, field: &'static str) -> Result<String, ContactError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or(ContactError::MissingField(field))
}

async fn submit_contact(State(state): State<AppState>, body: Bytes) -> Result<Response, ContactError> {
    let submission = parse_submission(&body)?;
    let record = state.store.create(submission).map_err(ContactError::Save)?;
    tracing::info!(id = %record.id, "contact message stored");
    Ok((StatusCode::CREATED, Json(json!({ "success": true }))).into_response())
}

async fn list_messages(State(state): State<AppState>, headers: HeaderMap) -> Result<Response, ContactError> {
    let identity = state.auth.authenticate(&headers)?;
    state.limiter.check(&identity.to_string())?;

    let messages = state.store.list_newest_first().map_err(ContactError::Fetch)?;
    tracing::debug!(%identity, count = messages.len(), "listing messages");

    let mut response = Json(messages).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("private, no-store"));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_fields() {
        let parsed =
            parse_submission(br#"{"name":"  Ada ","email":"ada@example.com","message":" hi "}"#).unwrap();
        assert_eq!(parsed.name, "Ada");
        assert_eq!(parsed.message, "hi");
    }

    #[test]
    fn test_parse_reports_first_missing_field() {
        let err = parse_submission(br#"{"email":"","message":""}"#).unwrap_err();
        assert!(matches!(err, ContactError::MissingField("name")));

        let err = parse_submission(br#"{"name":"Ada","email":42,"message":"hi"}"#).unwrap_err();
        assert!(matches!(err, ContactError::MissingField("email")));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_submission(b"name=Ada"),
            Err(ContactError::InvalidJson)
        ));
    }

    #[test]
    fn test_non_object_body_is_missing_name() {
        assert!(matches!(
            parse_submission(b"[1, 2]"),
            Err(ContactError::MissingField("name"))
        ));
    }
}
