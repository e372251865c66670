// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Personal info: load with defaults, edit one section, merge-write it back.

use crate::db::{collections, DocumentStore};
use crate::error::Result;
use crate::models::PersonalInfoRecord;
use crate::services::editor::RecordEditor;

/// The user's personal info, or empty defaults if it is missing or unreadable.
pub async fn load_personal_info(store: &DocumentStore, uid: &str) -> PersonalInfoRecord {
    match store
        .get::<PersonalInfoRecord>(collections::PERSONAL_INFO, uid)
        .await
    {
        Ok(Some(record)) => record,
        Ok(None) => {
            tracing::debug!(uid = %uid, "No personal info document, using defaults");
            PersonalInfoRecord::default()
        }
        Err(e) => {
            tracing::warn!(uid = %uid, error = %e, "Failed to load personal info, using defaults");
            PersonalInfoRecord::default()
        }
    }
}

/// Edit one section of the personal info and save only its `fields`.
///
/// The read, edit, validation and write run as one atomic update, so
/// concurrent section saves never lose each other's changes. A stored
/// document that cannot be decoded fails the save and is left untouched.
pub async fn update_personal_info<F>(
    store: &DocumentStore,
    uid: &str,
    fields: &'static [&'static str],
    edit: F,
) -> Result<PersonalInfoRecord>
where
    F: FnOnce(&mut PersonalInfoRecord) + Send,
{
    let saved = store
        .update_atomic(
            collections::PERSONAL_INFO,
            uid,
            fields,
            move |current: Option<PersonalInfoRecord>| {
                let mut editor = RecordEditor::new();
                editor.open(current)?;
                editor.edit(edit)?;
                let record = editor.commit()?;
                Ok((record.clone(), record))
            },
        )
        .await?;

    tracing::info!(uid = %uid, fields = ?fields, "Personal info saved");
    Ok(saved)
}
