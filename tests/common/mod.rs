// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use profile_hub::config::Config;
use profile_hub::db::DocumentStore;
use profile_hub::models::UserSession;
use profile_hub::routes::create_router;
use profile_hub::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test store connection against the emulator.
#[allow(dead_code)]
pub async fn test_store() -> DocumentStore {
    DocumentStore::firestore("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app with the given config and an in-memory store.
#[allow(dead_code)]
pub fn create_test_app_with(config: Config) -> (axum::Router, Arc<AppState>) {
    let store = DocumentStore::in_memory();
    let state = Arc::new(AppState::new(config, store).expect("Failed to build test state"));
    (create_router(state.clone()), state)
}

/// Create a test app with offline dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(Config::test_default())
}

#[allow(dead_code)]
pub fn test_session(uid: &str, display_name: &str) -> UserSession {
    UserSession {
        uid: uid.to_string(),
        display_name: display_name.to_string(),
        email: format!("{}@example.com", uid),
        avatar_url: None,
        signed_in_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

/// Start a session for `uid` and return its token.
#[allow(dead_code)]
pub fn sign_in(state: &AppState, uid: &str) -> String {
    state
        .sessions
        .sign_in(&test_session(uid, "Test User"))
        .expect("Failed to sign in")
}

/// Build a request with an optional bearer token and JSON body.
#[allow(dead_code)]
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn read_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
