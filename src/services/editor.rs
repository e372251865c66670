// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Generic record editor.
//!
//! An editor walks `Closed -> Loading -> Editing -> Saving -> Closed`.
//! Edits touch only the local draft. The draft is validated when `save`
//! enters `Saving` and then handed to a [`SaveTarget`], which owns the
//! persistence strategy for the record kind. A failed save drops back to
//! `Editing` with the error kept in `last_error`; the editor only closes on
//! success or explicit cancel.

use crate::error::{AppError, Result};
use std::future::Future;
use validator::Validate;

/// Editor lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Closed,
    Loading,
    Editing,
    Saving,
}

/// Persists a validated draft and returns the record as stored.
pub trait SaveTarget<R> {
    fn save(&self, draft: R) -> impl Future<Output = Result<R>> + Send;
}

#[derive(Debug)]
pub struct RecordEditor<R> {
    state: EditorState,
    draft: R,
    last_error: Option<String>,
}

impl<R> Default for RecordEditor<R>
where
    R: Default + Clone + Validate + Send,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R> RecordEditor<R>
where
    R: Default + Clone + Validate + Send,
{
    pub fn new() -> Self {
        Self {
            state: EditorState::Closed,
            draft: R::default(),
            last_error: None,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn draft(&self) -> &R {
        &self.draft
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Open on an existing record, or on empty defaults for a new one.
    pub fn open(&mut self, existing: Option<R>) -> Result<()> {
        if self.state != EditorState::Closed {
            return Err(AppError::BadRequest(format!(
                "editor cannot open while {:?}",
                self.state
            )));
        }
        self.state = EditorState::Loading;
        self.draft = existing.unwrap_or_default();
        self.last_error = None;
        self.state = EditorState::Editing;
        Ok(())
    }

    /// Apply a field edit to the draft. No validation happens here.
    pub fn edit<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut R),
    {
        if self.state != EditorState::Editing {
            return Err(AppError::BadRequest(format!(
                "editor cannot edit while {:?}",
                self.state
            )));
        }
        f(&mut self.draft);
        Ok(())
    }

    /// Discard the draft and close.
    pub fn cancel(&mut self) {
        self.state = EditorState::Closed;
        self.draft = R::default();
        self.last_error = None;
    }

    /// Validate and persist the draft. Closes the editor on success.
    pub async fn save<T>(&mut self, target: &T) -> Result<R>
    where
        T: SaveTarget<R> + Sync,
    {
        let draft = self.begin_save()?;
        let result = target.save(draft).await;
        self.finish_save(result)
    }

    /// Validate the draft and close, returning it for the caller to write.
    ///
    /// Used when the write happens inside a store transaction that already
    /// holds the document.
    pub fn commit(&mut self) -> Result<R> {
        let draft = self.begin_save()?;
        self.finish_save(Ok(draft))
    }

    fn begin_save(&mut self) -> Result<R> {
        if self.state != EditorState::Editing {
            return Err(AppError::BadRequest(format!(
                "editor cannot save while {:?}",
                self.state
            )));
        }
        self.state = EditorState::Saving;

        if let Err(errors) = self.draft.validate() {
            let err = AppError::from(errors);
            self.last_error = Some(err.to_string());
            self.state = EditorState::Editing;
            return Err(err);
        }
        Ok(self.draft.clone())
    }

    fn finish_save(&mut self, result: Result<R>) -> Result<R> {
        match result {
            Ok(saved) => {
                self.state = EditorState::Closed;
                self.draft = R::default();
                self.last_error = None;
                Ok(saved)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Save failed, editor stays open");
                self.last_error = Some(err.to_string());
                self.state = EditorState::Editing;
                Err(err)
            }
        }
    }
}
