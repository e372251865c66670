// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Profile Hub: personal profile, education and work history
//!
//! This crate provides the backend API behind the profile editor: Google
//! sign-in, session handling, and read-merge-write editing of per-user
//! documents in Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::DocumentStore;
use services::{GoogleIdentity, SessionProvider};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: DocumentStore,
    pub sessions: SessionProvider,
    pub identity: GoogleIdentity,
}

impl AppState {
    pub fn new(config: Config, store: DocumentStore) -> anyhow::Result<Self> {
        let sessions = SessionProvider::new(&config.jwt_signing_key);
        let identity = GoogleIdentity::new(&config)?;
        Ok(Self {
            config,
            store,
            sessions,
            identity,
        })
    }
}
