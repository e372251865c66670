// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed-in user identity.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Identity of the signed-in user, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserSession {
    /// Opaque provider subject, used as the document key everywhere
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    /// When the session was issued (RFC 3339)
    pub signed_in_at: String,
}

impl UserSession {
    /// Current time in the `signed_in_at` format (RFC 3339, `Z` suffix).
    pub fn now_timestamp() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
