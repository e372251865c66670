// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Education and work experience list routes.
//!
//! Both lists share one set of handlers, instantiated per record kind.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{EducationRecord, ListRecord, WorkRecord};
use crate::services::records::{save_entry, ListPresenter, ListView};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, put},
    Extension, Json, Router,
};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/education",
            get(list::<EducationRecord>).post(create::<EducationRecord>),
        )
        .route("/api/education/{id}", put(update::<EducationRecord>))
        .route(
            "/api/work",
            get(list::<WorkRecord>).post(create::<WorkRecord>),
        )
        .route("/api/work/{id}", put(update::<WorkRecord>))
}

/// Entries in stored order, with a placeholder message when empty.
async fn list<R: ListRecord>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<ListView<R>> {
    Json(
        ListPresenter::new(&state.store, &user.uid)
            .load::<R>()
            .await,
    )
}

/// Append a new entry. Any id in the body is ignored.
async fn create<R: ListRecord>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<R>,
) -> Result<Json<ListView<R>>> {
    let view = save_entry(&state.store, &user.uid, None, input).await?;
    Ok(Json(view))
}

/// Replace entry `id` in place.
async fn update<R: ListRecord>(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<R>,
) -> Result<Json<ListView<R>>> {
    let view = save_entry(&state.store, &user.uid, Some(&id), input).await?;
    Ok(Json(view))
}
