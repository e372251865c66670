// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google OAuth client for the sign-in flow.
//!
//! Handles:
//! - Building the authorization redirect
//! - Exchanging the authorization code for an access token
//! - Fetching the user's profile from the userinfo endpoint

use crate::config::Config;
use crate::error::AppError;
use crate::models::UserSession;
use serde::Deserialize;
use std::time::Duration;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const SCOPES: &str = "openid email profile";

/// Google identity client.
#[derive(Clone)]
pub struct GoogleIdentity {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
}

/// Token endpoint response. Only the access token is used.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// OpenID Connect userinfo response.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUserInfo {
    pub sub: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

impl From<GoogleUserInfo> for UserSession {
    fn from(info: GoogleUserInfo) -> Self {
        UserSession {
            uid: info.sub,
            display_name: info.name.unwrap_or_default(),
            email: info.email.unwrap_or_default(),
            avatar_url: info.picture,
            signed_in_at: UserSession::now_timestamp(),
        }
    }
}

impl GoogleIdentity {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            auth_url: config.google_auth_url.clone(),
            token_url: config.google_token_url.clone(),
            userinfo_url: config.google_userinfo_url.clone(),
        })
    }

    /// URL the browser is sent to for the Google consent screen.
    pub fn authorize_url(&self, callback_url: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&state={}&prompt=select_account",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(callback_url),
            urlencoding::encode(SCOPES),
            state
        )
    }

    /// Exchange an authorization code and build the resulting session.
    pub async fn exchange_code(
        &self,
        code: &str,
        callback_url: &str,
    ) -> Result<UserSession, AppError> {
        let token = self.exchange_token(code, callback_url).await?;
        let info = self.get_user_info(&token.access_token).await?;

        tracing::info!(uid = %info.sub, "Google sign-in succeeded");
        Ok(info.into())
    }

    async fn exchange_token(
        &self,
        code: &str,
        callback_url: &str,
    ) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", callback_url),
            ])
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Token request failed: {}", e)))?;

        check_response_json(response).await
    }

    async fn get_user_info(&self, access_token: &str) -> Result<GoogleUserInfo, AppError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::Identity(format!("Userinfo request failed: {}", e)))?;

        let info: GoogleUserInfo = check_response_json(response).await?;
        if info.sub.trim().is_empty() {
            return Err(AppError::Identity("userinfo without subject".to_string()));
        }
        Ok(info)
    }
}

/// Check response and parse JSON body.
async fn check_response_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, AppError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(AppError::Identity(format!("HTTP {}: {}", status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Identity(format!("JSON parse error: {}", e)))
}
