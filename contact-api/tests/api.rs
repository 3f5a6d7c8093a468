//! HTTP-level tests for the contact service.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use contact_api::{router, AdminAuth, AppState, InMemoryStore, MessageStore, RateLimitConfig, RateLimiter};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

const TOKEN: &str = "test-admin-token";

fn app_with(store: Arc<InMemoryStore>, max_requests: u32) -> Router {
    let limiter = RateLimiter::new(RateLimitConfig {
        max_requests,
        window: Duration::from_secs(60),
        ..RateLimitConfig::default()
    });
    router(AppState::new(store, limiter, AdminAuth::new([TOKEN])))
}

fn app() -> (Router, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    (app_with(Arc::clone(&store), 30), store)
}

fn contact(body: impl Into<Body>) -> Request<Body> {
    Request::post("/api/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn messages(token: Option<&str>) -> Request<Body> {
    let mut req = Request::get("/api/messages");
    if let Some(token) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    req.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn valid() -> Value {
    json!({"name": "Ada", "email": "ada@example.com", "message": "Hello there"})
}

#[tokio::test]
async fn submission_is_stored() {
    let (app, store) = app();
    let response = app.oneshot(contact(valid().to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(json_body(response).await, json!({"success": true}));

    let stored = store.list_newest_first().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].email, "ada@example.com");
}

#[tokio::test]
async fn empty_email_is_rejected_and_nothing_stored() {
    let (app, store) = app();
    let body = json!({"name": "Ada", "email": "", "message": "Hello"});
    let response = app.oneshot(contact(body.to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error = json_body(response).await;
    assert!(error["error"].as_str().unwrap().contains("email"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn blank_and_mistyped_fields_are_rejected() {
    let cases = [
        json!({"name": "   ", "email": "a@b.c", "message": "hi"}),
        json!({"name": "Ada", "email": "a@b.c", "message": 7}),
        json!({"name": "Ada", "email": "a@b.c"}),
    ];
    for body in cases {
        let (app, store) = app();
        let response = app.oneshot(contact(body.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert!(store.is_empty());
    }
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let (app, store) = app();
    let response = app.oneshot(contact("{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "Invalid JSON"}));
    assert!(store.is_empty());
}

#[tokio::test]
async fn store_failure_returns_generic_500() {
    let store = Arc::new(InMemoryStore::with_capacity(0));
    let app = app_with(store, 30);
    let response = app.oneshot(contact(valid().to_string())).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Failed to save message"})
    );
}

#[tokio::test]
async fn listing_requires_a_valid_token() {
    let (app, _) = app();

    let response = app.clone().oneshot(messages(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await, json!({"error": "Unauthorized"}));

    let response = app.oneshot(messages(Some("wrong"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_is_newest_first_and_uncached() {
    let (app, _) = app();
    for name in ["first", "second", "third"] {
        let body = json!({"name": name, "email": "x@example.com", "message": "m"});
        let response = app.clone().oneshot(contact(body.to_string())).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    let response = app.oneshot(messages(Some(TOKEN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "private, no-store"
    );

    let listed = json_body(response).await;
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["third", "second", "first"]);
    assert!(listed[0]["createdAt"].is_string());
    assert!(listed[0]["id"].is_string());
}

#[tokio::test]
async fn listing_is_rate_limited_per_identity() {
    let (app, _) = app();
    for _ in 0..30 {
        let response = app.clone().oneshot(messages(Some(TOKEN))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(messages(Some(TOKEN))).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json_body(response).await, json!({"error": "Too many requests"}));

    // Unauthenticated requests are rejected before they count.
    let response = app.oneshot(messages(None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
