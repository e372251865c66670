// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Education and work lists: presentation and the append-or-replace save.

use crate::db::DocumentStore;
use crate::error::{AppError, Result};
use crate::models::{record_id, ListRecord};
use crate::services::editor::{RecordEditor, SaveTarget};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Stored shape of a list document: `{ "<FIELD>": [entries...] }`.
///
/// Only `R::FIELD` is read back. Other keys are skipped, including the
/// `_firestore_*` metadata Firestore adds to every decoded document.
#[derive(Debug, Clone, PartialEq)]
pub struct ListDocument<R> {
    pub entries: Vec<R>,
}

impl<R> ListDocument<R> {
    pub fn new(entries: Vec<R>) -> Self {
        Self { entries }
    }
}

impl<R> Default for ListDocument<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<R: ListRecord> Serialize for ListDocument<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(R::FIELD, &self.entries)?;
        map.end()
    }
}

impl<'de, R: ListRecord> Deserialize<'de> for ListDocument<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct DocumentVisitor<R>(PhantomData<R>);

        impl<'de, R: ListRecord> Visitor<'de> for DocumentVisitor<R> {
            type Value = ListDocument<R>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "a document with a `{}` array", R::FIELD)
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries: Option<Vec<R>> = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == R::FIELD {
                        if entries.is_some() {
                            return Err(de::Error::duplicate_field(R::FIELD));
                        }
                        // A null array reads as empty
                        entries = Some(map.next_value::<Option<Vec<R>>>()?.unwrap_or_default());
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                Ok(ListDocument::new(entries.unwrap_or_default()))
            }
        }

        deserializer.deserialize_map(DocumentVisitor(PhantomData))
    }
}

/// A user's list as shown to the client.
#[derive(Debug, Clone, Serialize)]
pub struct ListView<R> {
    pub entries: Vec<R>,
    /// Placeholder text, present only when `entries` is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

impl<R: ListRecord> ListView<R> {
    pub fn new(entries: Vec<R>) -> Self {
        let empty_message = entries
            .is_empty()
            .then(|| R::EMPTY_MESSAGE.to_string());
        Self {
            entries,
            empty_message,
        }
    }
}

/// Reads one user's lists.
pub struct ListPresenter<'a> {
    store: &'a DocumentStore,
    uid: &'a str,
}

impl<'a> ListPresenter<'a> {
    pub fn new(store: &'a DocumentStore, uid: &'a str) -> Self {
        Self { store, uid }
    }

    /// Stored entries in order. A missing document is an empty list.
    pub async fn entries<R: ListRecord>(&self) -> Result<Vec<R>> {
        let doc: Option<ListDocument<R>> = self.store.get(R::COLLECTION, self.uid).await?;
        Ok(doc.map(|d| d.entries).unwrap_or_default())
    }

    /// Entries for display. Read failures degrade to an empty list.
    pub async fn load<R: ListRecord>(&self) -> ListView<R> {
        match self.entries::<R>().await {
            Ok(entries) => ListView::new(entries),
            Err(e) => {
                tracing::warn!(
                    uid = %self.uid,
                    collection = R::COLLECTION,
                    error = %e,
                    "Failed to load list, showing empty"
                );
                ListView::new(Vec::new())
            }
        }
    }

    pub async fn find<R: ListRecord>(&self, id: &str) -> Result<R> {
        self.entries::<R>()
            .await?
            .into_iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| AppError::NotFound(format!("{} entry {}", R::FIELD, id)))
    }
}

/// Replace the entry sharing `draft`'s id, or append `draft` with a fresh id.
///
/// Order of the other entries is unchanged.
pub fn upsert_entry<R: ListRecord>(entries: &mut Vec<R>, mut draft: R) -> Result<R> {
    if draft.id().is_empty() {
        let id = record_id::generate(entries.iter().map(|e| e.id()));
        draft.set_id(id);
        entries.push(draft.clone());
        return Ok(draft);
    }

    let slot = entries
        .iter_mut()
        .find(|e| e.id() == draft.id())
        .ok_or_else(|| AppError::NotFound(format!("{} entry {}", R::FIELD, draft.id())))?;
    *slot = draft.clone();
    Ok(draft)
}

/// Saves list entries through a single atomic read-modify-write.
pub struct ListSaver<'a> {
    store: &'a DocumentStore,
    uid: &'a str,
}

impl<'a> ListSaver<'a> {
    pub fn new(store: &'a DocumentStore, uid: &'a str) -> Self {
        Self { store, uid }
    }
}

impl<R: ListRecord> SaveTarget<R> for ListSaver<'_> {
    async fn save(&self, draft: R) -> Result<R> {
        let saved = self
            .store
            .update_atomic(
                R::COLLECTION,
                self.uid,
                &[R::FIELD],
                move |doc: Option<ListDocument<R>>| {
                    let mut doc = doc.unwrap_or_default();
                    let saved = upsert_entry(&mut doc.entries, draft)?;
                    Ok((doc, saved))
                },
            )
            .await?;

        tracing::info!(
            uid = %self.uid,
            collection = R::COLLECTION,
            id = %saved.id(),
            "List entry saved"
        );
        Ok(saved)
    }
}

/// Open an editor on entry `existing_id` (or a new entry), apply `input`,
/// save, and return the reloaded list.
pub async fn save_entry<R: ListRecord>(
    store: &DocumentStore,
    uid: &str,
    existing_id: Option<&str>,
    input: R,
) -> Result<ListView<R>> {
    let presenter = ListPresenter::new(store, uid);
    let existing = match existing_id {
        Some(id) => Some(presenter.find::<R>(id).await?),
        None => None,
    };

    let mut editor = RecordEditor::new();
    editor.open(existing)?;
    editor.edit(|draft: &mut R| {
        // The id is owned by the stored entry, never by the submitted form.
        let id = draft.id().to_string();
        *draft = input;
        draft.set_id(id);
    })?;
    editor.save(&ListSaver::new(store, uid)).await?;

    Ok(presenter.load::<R>().await)
}
