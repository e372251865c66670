// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session provider: issues session tokens and broadcasts sign-in state.
//!
//! A session is a signed HS256 JWT that carries the user's identity, so any
//! instance can validate it without a lookup. Sign-out revokes the token's
//! session id for the rest of its lifetime.

use crate::models::UserSession;
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Session lifetime (30 days).
const SESSION_TTL_SECS: usize = 30 * 24 * 60 * 60;
const CHANNEL_CAPACITY: usize = 64;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity provider user id)
    pub sub: String,
    /// Session id, used for revocation
    pub sid: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Signed-in timestamp (RFC 3339)
    pub sat: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// A change in sign-in state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    SignedIn(UserSession),
    SignedOut { uid: String },
}

/// Issues, validates and revokes sessions.
pub struct SessionProvider {
    signing_key: Vec<u8>,
    /// Revoked session id -> token expiry
    revoked: DashMap<String, usize>,
    events: broadcast::Sender<SessionChange>,
    counter: AtomicU64,
}

/// Handle returned by [`SessionProvider::on_change`]. Dropping it unsubscribes.
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn now_unix_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as usize
}

impl SessionProvider {
    pub fn new(signing_key: &[u8]) -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            signing_key: signing_key.to_vec(),
            revoked: DashMap::new(),
            events,
            counter: AtomicU64::new(0),
        }
    }

    fn new_session_id(&self, uid: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        let digest = Sha256::digest(format!("{uid}|{nanos}|{n}").as_bytes());
        hex::encode(&digest[..16])
    }

    /// Start a session for `session` and return its token.
    pub fn sign_in(&self, session: &UserSession) -> anyhow::Result<String> {
        let now = now_unix_secs();
        let claims = Claims {
            sub: session.uid.clone(),
            sid: self.new_session_id(&session.uid),
            name: session.display_name.clone(),
            email: session.email.clone(),
            picture: session.avatar_url.clone(),
            sat: session.signed_in_at.clone(),
            iat: now,
            exp: now + SESSION_TTL_SECS,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.signing_key),
        )?;

        tracing::info!(uid = %session.uid, "Session started");
        let _ = self.events.send(SessionChange::SignedIn(session.clone()));
        Ok(token)
    }

    fn decode_claims(&self, token: &str) -> Option<Claims> {
        let key = DecodingKey::from_secret(&self.signing_key);
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<Claims>(token, &key, &validation).ok()?.claims;

        if self.revoked.contains_key(&claims.sid) {
            return None;
        }
        Some(claims)
    }

    /// The user a token belongs to, if it is valid and not signed out.
    pub fn current_user(&self, token: &str) -> Option<UserSession> {
        self.decode_claims(token).map(|claims| UserSession {
            uid: claims.sub,
            display_name: claims.name,
            email: claims.email,
            avatar_url: claims.picture,
            signed_in_at: claims.sat,
        })
    }

    /// End the session behind `token`. Returns false if it was not a live session.
    pub fn sign_out(&self, token: &str) -> bool {
        let Some(claims) = self.decode_claims(token) else {
            return false;
        };

        let now = now_unix_secs();
        self.revoked.retain(|_, exp| *exp > now);
        self.revoked.insert(claims.sid, claims.exp);

        tracing::info!(uid = %claims.sub, "Session ended");
        let _ = self.events.send(SessionChange::SignedOut { uid: claims.sub });
        true
    }

    /// Call `callback` for every sign-in or sign-out from now on.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn on_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(SessionChange) + Send + 'static,
    {
        let mut rx = self.events.subscribe();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => callback(change),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Session subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Subscription { handle }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(uid: &str) -> UserSession {
        UserSession {
            uid: uid.to_string(),
            display_name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            avatar_url: None,
            signed_in_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn token_roundtrip() {
        let provider = SessionProvider::new(b"test_signing_key_32_bytes_long!!");
        let token = provider.sign_in(&session("u1")).unwrap();
        assert_eq!(provider.current_user(&token), Some(session("u1")));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let a = SessionProvider::new(b"key_a_key_a_key_a_key_a_key_a_aa");
        let b = SessionProvider::new(b"key_b_key_b_key_b_key_b_key_b_bb");
        let token = a.sign_in(&session("u1")).unwrap();
        assert!(b.current_user(&token).is_none());
    }

    #[test]
    fn sign_out_revokes_only_that_session() {
        let provider = SessionProvider::new(b"test_signing_key_32_bytes_long!!");
        let first = provider.sign_in(&session("u1")).unwrap();
        let second = provider.sign_in(&session("u1")).unwrap();
        assert_ne!(first, second);

        assert!(provider.sign_out(&first));
        assert!(provider.current_user(&first).is_none());
        assert!(provider.current_user(&second).is_some());
        assert!(!provider.sign_out(&first));
    }

    #[test]
    fn garbage_token_is_rejected() {
        let provider = SessionProvider::new(b"test_signing_key_32_bytes_long!!");
        assert!(provider.current_user("invalid.token.here").is_none());
        assert!(!provider.sign_out("invalid.token.here"));
    }
}
