// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google sign-in and sign-out routes.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::Redirect,
    routing::get,
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::error::{AppError, Result};
use crate::middleware::auth::{extract_token, SESSION_COOKIE};
use crate::services::bootstrap::provision_user;
use crate::AppState;

// Type alias for HMAC-SHA256
type HmacSha256 = Hmac<Sha256>;

const SESSION_COOKIE_DAYS: i64 = 30;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/google", get(auth_start))
        .route("/auth/google/callback", get(auth_callback))
        .route("/auth/logout", get(logout))
}

/// Query parameters for starting OAuth flow.
#[derive(Deserialize)]
pub struct AuthStartParams {
    /// Frontend URL to redirect back to after sign-in completes.
    /// If not provided, uses FRONTEND_URL env var.
    #[serde(default)]
    redirect_uri: Option<String>,
}

fn is_local(host: &str) -> bool {
    host.contains("localhost") || host.contains("127.0.0.1")
}

fn request_host(headers: &HeaderMap) -> String {
    headers
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            std::env::var("API_HOST").unwrap_or_else(|_| "localhost:8080".to_string())
        })
}

/// Callback URL registered with Google, derived from the request host.
fn callback_url(headers: &HeaderMap) -> String {
    let host = request_host(headers);
    let scheme = if is_local(&host) { "http" } else { "https" };
    format!("{}://{}/auth/google/callback", scheme, host)
}

/// Sign a frontend URL into an OAuth state parameter.
pub fn sign_state(frontend_url: &str, secret: &[u8]) -> Result<String> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("System time error: {}", e)))?
        .as_millis();

    // Create the data payload: "frontend_url|timestamp_hex"
    let state_payload = format!("{}|{:x}", frontend_url, timestamp);

    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("HMAC init failed: {}", e)))?;
    mac.update(state_payload.as_bytes());
    let signature = mac.finalize().into_bytes();

    // "payload|signature_hex", base64 encoded for the URL
    let signed_state = format!("{}|{}", state_payload, hex::encode(signature));
    Ok(URL_SAFE_NO_PAD.encode(signed_state.as_bytes()))
}

/// Verify HMAC signature and decode the frontend URL from the OAuth state parameter.
pub fn verify_and_decode_state(state: &str, secret: &[u8]) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(state).ok()?;
    let state_str = String::from_utf8(bytes).ok()?;

    // Format is "frontend_url|timestamp_hex|signature_hex"; the URL itself may not contain '|'
    let (payload, signature_hex) = state_str.rsplit_once('|')?;
    let (frontend_url, _timestamp_hex) = payload.split_once('|')?;

    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(payload.as_bytes());
    let expected_signature = hex::encode(mac.finalize().into_bytes());

    if !bool::from(signature_hex.as_bytes().ct_eq(expected_signature.as_bytes())) {
        tracing::error!("OAuth state signature mismatch! Potential tampering.");
        return None;
    }

    Some(frontend_url.to_string())
}

/// Start sign-in - redirect to Google authorization.
async fn auth_start(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AuthStartParams>,
    headers: HeaderMap,
) -> Result<Redirect> {
    let frontend_url = params
        .redirect_uri
        .unwrap_or_else(|| state.config.frontend_url.clone());

    let oauth_state = sign_state(&frontend_url, &state.config.oauth_state_key)?;
    let auth_url = state
        .identity
        .authorize_url(&callback_url(&headers), &oauth_state);

    tracing::info!(
        frontend_url = %frontend_url,
        "Starting sign-in, redirecting to Google"
    );

    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

fn error_redirect(frontend_url: &str, error: &str) -> Redirect {
    Redirect::temporary(&format!(
        "{}?error={}",
        frontend_url,
        urlencoding::encode(error)
    ))
}

/// OAuth callback - exchange code, provision on first sign-in, start session.
async fn auth_callback(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect)> {
    let frontend_url = params
        .state
        .as_deref()
        .and_then(|s| verify_and_decode_state(s, &state.config.oauth_state_key))
        .unwrap_or_else(|| {
            tracing::warn!(
                "Invalid or tampered state parameter, falling back to default frontend URL"
            );
            state.config.frontend_url.clone()
        });

    if let Some(error) = params.error {
        tracing::warn!(error = %error, "Sign-in rejected by Google");
        return Ok((jar, error_redirect(&frontend_url, &error)));
    }

    let Some(code) = params.code else {
        tracing::warn!("Callback without authorization code");
        return Ok((jar, error_redirect(&frontend_url, "missing_code")));
    };

    let session = match state
        .identity
        .exchange_code(&code, &callback_url(&headers))
        .await
    {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(error = %e, "Sign-in failed");
            return Ok((jar, error_redirect(&frontend_url, "sign_in_failed")));
        }
    };

    // Editors fall back to defaults, and provisioning is retried on next sign-in.
    if let Err(e) = provision_user(&state.store, &session).await {
        tracing::error!(uid = %session.uid, error = %e, "Failed to provision user, continuing");
    }

    let token = state
        .sessions
        .sign_in(&session)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(!is_local(&request_host(&headers)))
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::days(SESSION_COOKIE_DAYS));

    Ok((jar.add(cookie), Redirect::temporary(&frontend_url)))
}

/// Sign out - revoke the session and clear the cookie.
async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(token) = extract_token(&jar, &headers) {
        if !state.sessions.sign_out(&token) {
            tracing::debug!("Logout with stale or invalid session");
        }
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::temporary(&state.config.frontend_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_roundtrip() {
        let secret = b"secret_key";
        let state = sign_state("https://example.com", secret).unwrap();
        assert_eq!(
            verify_and_decode_state(&state, secret),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn test_verify_and_decode_state_invalid_signature() {
        let payload = format!("{}|{:x}", "https://example.com", 1234567890u128);
        let state_data = format!("{}|{}", payload, "invalid_signature");
        let encoded_state = URL_SAFE_NO_PAD.encode(state_data.as_bytes());

        assert_eq!(verify_and_decode_state(&encoded_state, b"secret_key"), None);
    }

    #[test]
    fn test_verify_and_decode_state_wrong_secret() {
        let state = sign_state("https://example.com", b"secret_key").unwrap();
        assert_eq!(verify_and_decode_state(&state, b"wrong_key"), None);
    }

    #[test]
    fn test_verify_and_decode_state_malformed() {
        let encoded_state = URL_SAFE_NO_PAD.encode("invalid");
        assert_eq!(verify_and_decode_state(&encoded_state, b"secret_key"), None);
        assert_eq!(verify_and_decode_state("not-base64!!", b"secret_key"), None);
    }

    #[test]
    fn test_callback_url_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::HOST, "localhost:8080".parse().unwrap());
        assert_eq!(
            callback_url(&headers),
            "http://localhost:8080/auth/google/callback"
        );

        headers.insert(axum::http::header::HOST, "api.example.com".parse().unwrap());
        assert_eq!(
            callback_url(&headers),
            "https://api.example.com/auth/google/callback"
        );
    }
}
