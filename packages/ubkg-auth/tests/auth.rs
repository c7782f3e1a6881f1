//! Integration test: `/umls-auth` against an in-memory validator.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use ubkg_auth::{router, AuthError, AuthState, UmlsValidator};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accepts exactly one key; an `unreachable` validator fails every call.
struct FakeValidator {
    licensed: &'static str,
    unreachable: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeValidator {
    fn accepting(licensed: &'static str) -> Arc<Self> {
        Arc::new(Self {
            licensed,
            unreachable: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            licensed: "",
            unreachable: true,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl UmlsValidator for FakeValidator {
    async fn validate(&self, key: &str) -> Result<bool, AuthError> {
        self.calls.lock().unwrap().push(key.to_string());
        if self.unreachable {
            return Err(AuthError::Upstream("connection refused".to_string()));
        }
        Ok(key == self.licensed)
    }
}

async fn send(validator: Arc<FakeValidator>, request: Request<Body>) -> (StatusCode, Value) {
    let response = router(AuthState::new(validator)).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| json!({ "raw": String::from_utf8_lossy(&bytes).to_string() }));
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_form(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/umls-auth")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_valid_key_by_query() {
    let validator = FakeValidator::accepting("k-123");
    let (status, body) = send(validator.clone(), get("/umls-auth?umls-key=k-123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));
    assert_eq!(*validator.calls.lock().unwrap(), vec!["k-123".to_string()]);
}

#[tokio::test]
async fn test_valid_key_by_form() {
    let (status, body) = send(FakeValidator::accepting("k-123"), post_form("umls-key=k-123")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));
}

#[tokio::test]
async fn test_refused_key_is_401() {
    let (status, body) = send(FakeValidator::accepting("k-123"), post_form("umls-key=other")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "The UMLS API key is not valid");
}

#[tokio::test]
async fn test_missing_key_is_401_without_upstream_call() {
    let validator = FakeValidator::accepting("k-123");
    let (status, body) = send(validator.clone(), get("/umls-auth")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Must include parameter 'umls-key'");

    let (status, _) = send(validator.clone(), post_form("other=1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(validator.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_401() {
    let (status, body) = send(FakeValidator::unreachable(), get("/umls-auth?umls-key=k-123")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "Unable to validate the UMLS API key: connection refused"
    );
}

#[tokio::test]
async fn test_index_greeting() {
    let (status, body) = send(FakeValidator::accepting("k"), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["raw"], "Hello! This is UBKG UMLS authentication service.");
}
