// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document store layer.
//!
//! Every document is keyed by the owning user's id inside a named
//! collection. `DocumentStore` dispatches to Firestore in production and to
//! a process-local map for local development and tests; both backends
//! implement the same merge and atomicity semantics.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreBackend;
pub use memory::MemoryBackend;

use crate::config::{Config, StoreBackend};
use crate::error::AppError;
use serde::{de::DeserializeOwned, Serialize};

/// Collection names as constants.
pub mod collections {
    /// Personal info, one document per user
    pub const PERSONAL_INFO: &str = "ClientInfo";
    /// `{ education: [...] }`, one document per user
    pub const EDUCATION: &str = "Education";
    /// `{ work: [...] }`, one document per user
    pub const WORK: &str = "Work";
}

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreBackend),
    Memory(MemoryBackend),
}

/// Handle to the document store. Cheap to clone.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Backend,
}

impl DocumentStore {
    /// Connect to the backend selected in the config.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        match config.store_backend {
            StoreBackend::Firestore => Self::firestore(&config.gcp_project_id).await,
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory document store; data is lost on restart");
                Ok(Self::in_memory())
            }
        }
    }

    pub async fn firestore(project_id: &str) -> Result<Self, AppError> {
        Ok(Self {
            backend: Backend::Firestore(FirestoreBackend::new(project_id).await?),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryBackend::default()),
        }
    }

    /// Short name of the active backend, for health checks and logs.
    pub fn backend_name(&self) -> &'static str {
        match &self.backend {
            Backend::Firestore(_) => "firestore",
            Backend::Memory(_) => "memory",
        }
    }

    /// Make every write to an in-memory store fail. Returns false for other backends.
    pub fn set_fail_writes(&self, fail: bool) -> bool {
        match &self.backend {
            Backend::Memory(m) => {
                m.set_fail_writes(fail);
                true
            }
            Backend::Firestore(_) => false,
        }
    }

    /// Read a whole document. `None` if it does not exist.
    pub async fn get<T>(&self, collection: &str, key: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        match &self.backend {
            Backend::Firestore(f) => f.get(collection, key).await,
            Backend::Memory(m) => m.get(collection, key),
        }
    }

    /// Replace the whole document.
    pub async fn put<T>(&self, collection: &str, key: &str, doc: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        match &self.backend {
            Backend::Firestore(f) => f.put(collection, key, doc).await,
            Backend::Memory(m) => m.put(collection, key, doc),
        }
    }

    /// Write only the named top-level `fields` of `doc`; other stored fields are kept.
    pub async fn merge_write<T>(
        &self,
        collection: &str,
        key: &str,
        doc: &T,
        fields: &[&str],
    ) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        match &self.backend {
            Backend::Firestore(f) => f.merge_write(collection, key, doc, fields).await,
            Backend::Memory(m) => m.merge_write(collection, key, doc, fields),
        }
    }

    /// Insert `doc` unless a document already exists. Returns whether it was created.
    pub async fn create_if_absent<T>(
        &self,
        collection: &str,
        key: &str,
        doc: &T,
    ) -> Result<bool, AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        match &self.backend {
            Backend::Firestore(f) => f.create_if_absent(collection, key, doc).await,
            Backend::Memory(m) => m.create_if_absent(collection, key, doc),
        }
    }

    /// Read, mutate and merge-write one document atomically.
    ///
    /// `mutate` receives the current document (or `None`) and returns the
    /// new document plus a value handed back to the caller. If it returns
    /// an error nothing is written.
    pub async fn update_atomic<T, R, F>(
        &self,
        collection: &str,
        key: &str,
        fields: &[&str],
        mutate: F,
    ) -> Result<R, AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
        R: Send,
        F: FnOnce(Option<T>) -> Result<(T, R), AppError> + Send,
    {
        match &self.backend {
            Backend::Firestore(f) => f.update_atomic(collection, key, fields, mutate).await,
            Backend::Memory(m) => m.update_atomic(collection, key, fields, mutate),
        }
    }
}
