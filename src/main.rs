// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile Hub API Server
//!
//! Serves the profile editor: Google sign-in, then personal info, education
//! and work experience stored per user in Firestore.

use profile_hub::{config::Config, db::DocumentStore, services::SessionChange, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        "Starting Profile Hub API"
    );

    let store = DocumentStore::connect(&config)
        .await
        .expect("Failed to connect to document store");

    let addr = format!("0.0.0.0:{}", config.port);

    // Build shared state
    let state = Arc::new(AppState::new(config, store).expect("Failed to initialize app state"));

    // Audit trail of sign-ins; lives as long as the server
    let _session_log = state.sessions.on_change(|change| match change {
        SessionChange::SignedIn(user) => {
            tracing::info!(uid = %user.uid, email = %user.email, "User signed in")
        }
        SessionChange::SignedOut { uid } => tracing::info!(uid = %uid, "User signed out"),
    });

    // Build router
    let app = profile_hub::routes::create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("profile_hub=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
