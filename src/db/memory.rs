// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store backend.
//!
//! Documents are held as JSON objects. Merge-writes copy only the masked
//! top-level fields, matching Firestore's update-mask behaviour.

use crate::error::AppError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type DocKey = (String, String);

#[derive(Clone, Default)]
pub struct MemoryBackend {
    docs: Arc<DashMap<DocKey, Map<String, Value>>>,
    fail_writes: Arc<AtomicBool>,
}

fn doc_key(collection: &str, key: &str) -> DocKey {
    (collection.to_string(), key.to_string())
}

fn to_object<T: Serialize>(doc: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(doc) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AppError::Database(format!(
            "document must serialize to an object, got {}",
            other
        ))),
        Err(e) => Err(AppError::Database(e.to_string())),
    }
}

fn from_object<T: DeserializeOwned>(doc: &Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(doc.clone())).map_err(|e| AppError::Database(e.to_string()))
}

fn apply_mask(target: &mut Map<String, Value>, source: Map<String, Value>, fields: &[&str]) {
    for field in fields {
        match source.get(*field) {
            Some(value) => {
                target.insert((*field).to_string(), value.clone());
            }
            None => {
                target.remove(*field);
            }
        }
    }
}

impl MemoryBackend {
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(
                "write rejected (in-memory store set to fail writes)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<T>, AppError> {
        self.docs
            .get(&doc_key(collection, key))
            .map(|doc| from_object(doc.value()))
            .transpose()
    }

    pub fn put<T: Serialize>(&self, collection: &str, key: &str, doc: &T) -> Result<(), AppError> {
        self.check_writable()?;
        let object = to_object(doc)?;
        self.docs.insert(doc_key(collection, key), object);
        Ok(())
    }

    pub fn merge_write<T: Serialize>(
        &self,
        collection: &str,
        key: &str,
        doc: &T,
        fields: &[&str],
    ) -> Result<(), AppError> {
        self.check_writable()?;
        let object = to_object(doc)?;
        let mut stored = self.docs.entry(doc_key(collection, key)).or_default();
        apply_mask(stored.value_mut(), object, fields);
        Ok(())
    }

    pub fn create_if_absent<T: Serialize>(
        &self,
        collection: &str,
        key: &str,
        doc: &T,
    ) -> Result<bool, AppError> {
        self.check_writable()?;
        let object = to_object(doc)?;
        match self.docs.entry(doc_key(collection, key)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(object);
                Ok(true)
            }
        }
    }

    /// Runs `mutate` while holding the entry's shard lock.
    pub fn update_atomic<T, R, F>(
        &self,
        collection: &str,
        key: &str,
        fields: &[&str],
        mutate: F,
    ) -> Result<R, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(Option<T>) -> Result<(T, R), AppError>,
    {
        self.check_writable()?;
        match self.docs.entry(doc_key(collection, key)) {
            Entry::Occupied(mut slot) => {
                let current = from_object(slot.get())?;
                let (next, out) = mutate(Some(current))?;
                apply_mask(slot.get_mut(), to_object(&next)?, fields);
                Ok(out)
            }
            Entry::Vacant(slot) => {
                let (next, out) = mutate(None)?;
                let mut object = Map::new();
                apply_mask(&mut object, to_object(&next)?, fields);
                slot.insert(object);
                Ok(out)
            }
        }
    }
}
