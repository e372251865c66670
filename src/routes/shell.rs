// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application shell: which top-level view the client should render.

use crate::middleware::auth::extract_token;
use crate::models::UserSession;
use crate::AppState;
use axum::{extract::State, http::HeaderMap, routing::get, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Tabs of the signed-in view, in display order.
pub const TABS: &[&str] = &["Profile", "Education", "Work Experience"];

pub const SIGN_IN_PATH: &str = "/auth/google";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/shell", get(get_shell))
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ShellResponse {
    /// Landing page with a single sign-in action.
    SignedOut { sign_in_url: String },
    /// Tabbed profile view.
    SignedIn {
        user: UserSession,
        tabs: Vec<String>,
    },
}

impl ShellResponse {
    pub fn for_session(session: Option<UserSession>) -> Self {
        match session {
            Some(user) => ShellResponse::SignedIn {
                user,
                tabs: TABS.iter().map(|t| t.to_string()).collect(),
            },
            None => ShellResponse::SignedOut {
                sign_in_url: SIGN_IN_PATH.to_string(),
            },
        }
    }
}

/// Public: an absent or dead session renders the landing view, not a 401.
async fn get_shell(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Json<ShellResponse> {
    let session = extract_token(&jar, &headers).and_then(|t| state.sessions.current_user(&t));
    Json(ShellResponse::for_session(session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_out_view() {
        let json = serde_json::to_value(ShellResponse::for_session(None)).unwrap();
        assert_eq!(json["view"], "signed_out");
        assert_eq!(json["sign_in_url"], SIGN_IN_PATH);
    }

    #[test]
    fn signed_in_view_lists_tabs_in_order() {
        let user = UserSession {
            uid: "u1".into(),
            display_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            avatar_url: None,
            signed_in_at: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_value(ShellResponse::for_session(Some(user))).unwrap();
        assert_eq!(json["view"], "signed_in");
        assert_eq!(json["user"]["uid"], "u1");
        assert_eq!(
            json["tabs"],
            serde_json::json!(["Profile", "Education", "Work Experience"])
        );
    }
}
