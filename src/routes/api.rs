// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users: identity and personal info.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::personal_info::{
    fields, normalize_tags, toggle_tag, BioUpdate, ContactInfoUpdate, LanguagesUpdate,
    TopicsUpdate, LANGUAGE_CATALOG, SUGGESTED_TOPICS,
};
use crate::models::{PersonalInfoRecord, UserSession};
use crate::services::profile::{load_personal_info, update_personal_info};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// API routes (require authentication via session token).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/profile", get(get_profile).put(put_contact))
        .route("/api/profile/bio", put(put_bio))
        .route("/api/profile/languages", put(put_languages))
        .route("/api/profile/languages/toggle", post(toggle_language))
        .route("/api/profile/topics", put(put_topics))
        .route("/api/profile/topics/toggle", post(toggle_topic))
        .route("/api/profile/options", get(get_options))
}

// ─── Identity ────────────────────────────────────────────────

/// Get the signed-in user's identity.
async fn get_me(Extension(user): Extension<AuthUser>) -> Json<UserSession> {
    Json(user.session)
}

// ─── Personal Info ───────────────────────────────────────────

/// Get personal info, with defaults for anything not yet stored.
async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<PersonalInfoRecord> {
    Json(load_personal_info(&state.store, &user.uid).await)
}

/// Save the personal and contact sections.
async fn put_contact(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ContactInfoUpdate>,
) -> Result<Json<PersonalInfoRecord>> {
    let saved = update_personal_info(&state.store, &user.uid, fields::CONTACT, |record| {
        update.apply(record)
    })
    .await?;
    Ok(Json(saved))
}

async fn put_bio(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<BioUpdate>,
) -> Result<Json<PersonalInfoRecord>> {
    let saved = update_personal_info(&state.store, &user.uid, fields::BIO, |record| {
        record.bio = update.bio
    })
    .await?;
    Ok(Json(saved))
}

/// Replace the preferred languages. Each must be in the catalog.
async fn put_languages(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<LanguagesUpdate>,
) -> Result<Json<PersonalInfoRecord>> {
    let languages = normalize_tags(update.languages);
    let saved = update_personal_info(&state.store, &user.uid, fields::LANGUAGES, |record| {
        record.preferred_language = languages
    })
    .await?;
    Ok(Json(saved))
}

/// Replace the interested topics. Free-form topics are allowed.
async fn put_topics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<TopicsUpdate>,
) -> Result<Json<PersonalInfoRecord>> {
    let topics = normalize_tags(update.topics);
    let saved = update_personal_info(&state.store, &user.uid, fields::TOPICS, |record| {
        record.interested_topic = topics
    })
    .await?;
    Ok(Json(saved))
}

/// Request body for a picker toggle.
#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub tag: String,
}

impl ToggleRequest {
    fn tag(&self) -> Result<String> {
        let tag = self.tag.trim();
        if tag.is_empty() {
            return Err(AppError::BadRequest("tag must not be empty".to_string()));
        }
        Ok(tag.to_string())
    }
}

async fn toggle_language(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<PersonalInfoRecord>> {
    let tag = req.tag()?;
    let saved = update_personal_info(&state.store, &user.uid, fields::LANGUAGES, |record| {
        toggle_tag(&mut record.preferred_language, &tag)
    })
    .await?;
    Ok(Json(saved))
}

async fn toggle_topic(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<PersonalInfoRecord>> {
    let tag = req.tag()?;
    let saved = update_personal_info(&state.store, &user.uid, fields::TOPICS, |record| {
        toggle_tag(&mut record.interested_topic, &tag)
    })
    .await?;
    Ok(Json(saved))
}

// ─── Picker Options ──────────────────────────────────────────

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileOptionsResponse {
    pub languages: Vec<String>,
    pub suggested_topics: Vec<String>,
}

async fn get_options() -> Json<ProfileOptionsResponse> {
    Json(ProfileOptionsResponse {
        languages: LANGUAGE_CATALOG.iter().map(|s| s.to_string()).collect(),
        suggested_topics: SUGGESTED_TOPICS.iter().map(|s| s.to_string()).collect(),
    })
}
