// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! First sign-in provisioning.

use crate::db::{collections, DocumentStore};
use crate::error::Result;
use crate::models::{EducationRecord, ListRecord, PersonalInfoRecord, UserSession, WorkRecord};
use crate::services::records::ListDocument;

/// Split a display name on single spaces into (first, last).
///
/// Tokens after the second are dropped; a one-token name has an empty last name.
pub fn split_display_name(display_name: &str) -> (String, String) {
    let mut parts = display_name.split(' ');
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.next().unwrap_or_default().to_string();
    (first, last)
}

/// Personal info seeded from the identity token.
pub fn initial_personal_info(session: &UserSession) -> PersonalInfoRecord {
    let (firstname, lastname) = split_display_name(&session.display_name);
    PersonalInfoRecord {
        firstname,
        lastname,
        email: session.email.clone(),
        ..Default::default()
    }
}

/// Create the user's documents if this is their first sign-in.
///
/// Returns true if the user was newly provisioned. Safe to call on every
/// sign-in: existing documents are never overwritten.
pub async fn provision_user(store: &DocumentStore, session: &UserSession) -> Result<bool> {
    let created = store
        .create_if_absent(
            collections::PERSONAL_INFO,
            &session.uid,
            &initial_personal_info(session),
        )
        .await?;

    if !created {
        tracing::debug!(uid = %session.uid, "User already provisioned");
        return Ok(false);
    }

    store
        .create_if_absent(
            EducationRecord::COLLECTION,
            &session.uid,
            &ListDocument::<EducationRecord>::default(),
        )
        .await?;
    store
        .create_if_absent(
            WorkRecord::COLLECTION,
            &session.uid,
            &ListDocument::<WorkRecord>::default(),
        )
        .await?;

    tracing::info!(uid = %session.uid, "Provisioned new user");
    Ok(true)
}
