// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in flow tests against a local stand-in for Google's endpoints.
//!
//! Covers the redirect, the callback's error paths, first sign-in
//! provisioning and the session cookie.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Form, Json, Router,
};
use profile_hub::config::Config;
use profile_hub::db::collections;
use profile_hub::models::{EducationRecord, ListRecord, PersonalInfoRecord, WorkRecord};
use profile_hub::routes::auth::sign_state;
use profile_hub::services::records::ListDocument;
use serde_json::json;
use std::collections::HashMap;
use tower::ServiceExt;

mod common;
use common::{create_test_app_with, json_request, read_json};

const GOOD_CODE: &str = "good-code";
const FAKE_ACCESS_TOKEN: &str = "fake-access-token";

async fn fake_token(Form(form): Form<HashMap<String, String>>) -> axum::response::Response {
    if form.get("code").map(String::as_str) == Some(GOOD_CODE)
        && form.get("grant_type").map(String::as_str) == Some("authorization_code")
    {
        Json(json!({ "access_token": FAKE_ACCESS_TOKEN, "expires_in": 3599 })).into_response()
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" }))).into_response()
    }
}

async fn fake_userinfo(headers: axum::http::HeaderMap) -> axum::response::Response {
    let expected = format!("Bearer {}", FAKE_ACCESS_TOKEN);
    if headers.get(header::AUTHORIZATION).and_then(|h| h.to_str().ok()) != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({
        "sub": "google-123",
        "name": "Rakesh Raushan",
        "email": "rakesh@example.com",
        "picture": "https://example.com/rakesh.png"
    }))
    .into_response()
}

/// Start the fake identity provider and return a config pointing at it.
async fn config_with_fake_google() -> Config {
    let app = Router::new()
        .route("/token", post(fake_token))
        .route("/userinfo", get(fake_userinfo));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Config {
        google_token_url: format!("http://{}/token", addr),
        google_userinfo_url: format!("http://{}/userinfo", addr),
        ..Config::test_default()
    }
}

fn callback_request(query: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/auth/google/callback?{}", query))
        .header(header::HOST, "localhost:8080")
        .body(Body::empty())
        .unwrap()
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

/// Session token from the callback's Set-Cookie header.
fn session_cookie(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix("profile_token="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
}

#[tokio::test]
async fn test_auth_start_redirects_to_google() {
    let (app, _) = create_test_app_with(Config::test_default());

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/auth/google")
                .header(header::HOST, "localhost:8080")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let url = location(&response);
    assert!(url.starts_with("https://accounts.google.com/o/oauth2/v2/auth?"));
    assert!(url.contains("client_id=test_client_id"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("state="));
}

#[tokio::test]
async fn test_first_sign_in_provisions_user() {
    let config = config_with_fake_google().await;
    let (app, state) = create_test_app_with(config);

    let response = app
        .clone()
        .oneshot(callback_request(&format!("code={}", GOOD_CODE)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "http://localhost:5173");
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Path=/"));

    let info: PersonalInfoRecord = state
        .store
        .get(collections::PERSONAL_INFO, "google-123")
        .await
        .unwrap()
        .expect("personal info created on first sign-in");
    assert_eq!(info.firstname, "Rakesh");
    assert_eq!(info.lastname, "Raushan");
    assert_eq!(info.email, "rakesh@example.com");

    let education: ListDocument<EducationRecord> = state
        .store
        .get(EducationRecord::COLLECTION, "google-123")
        .await
        .unwrap()
        .unwrap();
    assert!(education.entries.is_empty());
    let work: ListDocument<WorkRecord> = state
        .store
        .get(WorkRecord::COLLECTION, "google-123")
        .await
        .unwrap()
        .unwrap();
    assert!(work.entries.is_empty());

    // The issued cookie is a working session
    let token = session_cookie(&response).unwrap();
    let response = app
        .oneshot(json_request("GET", "/api/me", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = read_json(response).await;
    assert_eq!(me["uid"], "google-123");
    assert_eq!(me["display_name"], "Rakesh Raushan");
}

#[tokio::test]
async fn test_repeat_sign_in_does_not_overwrite() {
    let config = config_with_fake_google().await;
    let (app, state) = create_test_app_with(config);

    let response = app
        .clone()
        .oneshot(callback_request(&format!("code={}", GOOD_CODE)))
        .await
        .unwrap();
    let token = session_cookie(&response).unwrap();

    // User edits their name after signing up
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/profile",
            Some(&token),
            Some(json!({ "firstname": "Rakesh K.", "lastname": "Raushan" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(callback_request(&format!("code={}", GOOD_CODE)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let info: PersonalInfoRecord = state
        .store
        .get(collections::PERSONAL_INFO, "google-123")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(info.firstname, "Rakesh K.");
}

#[tokio::test]
async fn test_signed_state_selects_frontend() {
    let config = config_with_fake_google().await;
    let state_param = sign_state("http://localhost:3000/app", &config.oauth_state_key).unwrap();
    let (app, _) = create_test_app_with(config);

    let response = app
        .oneshot(callback_request(&format!(
            "code={}&state={}",
            GOOD_CODE, state_param
        )))
        .await
        .unwrap();

    assert_eq!(location(&response), "http://localhost:3000/app");
}

#[tokio::test]
async fn test_forged_state_falls_back_to_default_frontend() {
    let config = config_with_fake_google().await;
    let forged = sign_state("https://evil.example.com", b"not_the_real_state_key_32_bytes!").unwrap();
    let (app, _) = create_test_app_with(config);

    let response = app
        .oneshot(callback_request(&format!("code={}&state={}", GOOD_CODE, forged)))
        .await
        .unwrap();

    assert_eq!(location(&response), "http://localhost:5173");
}

#[tokio::test]
async fn test_rejected_code_redirects_with_error() {
    let config = config_with_fake_google().await;
    let (app, state) = create_test_app_with(config);

    let response = app
        .oneshot(callback_request("code=bad-code"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location(&response),
        "http://localhost:5173?error=sign_in_failed"
    );
    assert!(session_cookie(&response).is_none());

    let info: Option<PersonalInfoRecord> = state
        .store
        .get(collections::PERSONAL_INFO, "google-123")
        .await
        .unwrap();
    assert!(info.is_none());
}

#[tokio::test]
async fn test_user_cancel_redirects_with_error() {
    let (app, _) = create_test_app_with(Config::test_default());

    let response = app
        .oneshot(callback_request("error=access_denied"))
        .await
        .unwrap();

    assert_eq!(
        location(&response),
        "http://localhost:5173?error=access_denied"
    );
    assert!(session_cookie(&response).is_none());
}

#[tokio::test]
async fn test_missing_code_redirects_with_error() {
    let (app, _) = create_test_app_with(Config::test_default());

    let response = app.oneshot(callback_request("")).await.unwrap();

    assert_eq!(
        location(&response),
        "http://localhost:5173?error=missing_code"
    );
}

#[tokio::test]
async fn test_provisioning_failure_still_signs_in() {
    let config = config_with_fake_google().await;
    let (app, state) = create_test_app_with(config);
    state.store.set_fail_writes(true);

    let response = app
        .clone()
        .oneshot(callback_request(&format!("code={}", GOOD_CODE)))
        .await
        .unwrap();
    assert_eq!(location(&response), "http://localhost:5173");
    let token = session_cookie(&response).expect("session issued despite store failure");

    // Editors fall back to defaults
    let response = app
        .oneshot(json_request("GET", "/api/profile", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["firstname"], "");
}
