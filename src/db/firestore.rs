// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore backend with typed, collection-scoped operations.
//!
//! Merge-writes use Firestore update masks, so only the named top-level
//! fields are touched. Atomic updates read and write inside one
//! transaction; a conflicting concurrent commit makes ours fail rather than
//! silently overwrite.

use crate::error::AppError;
use firestore::errors::FirestoreError;
use firestore::FirestoreConsistencySelector;
use serde::{de::DeserializeOwned, Serialize};

fn db_err(e: FirestoreError) -> AppError {
    AppError::Database(e.to_string())
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreBackend {
    client: firestore::FirestoreDb,
}

impl FirestoreBackend {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    pub async fn get<T>(&self, collection: &str, key: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.client
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(key)
            .await
            .map_err(db_err)
    }

    pub async fn put<T>(&self, collection: &str, key: &str, doc: &T) -> Result<(), AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let _: T = self
            .client
            .fluent()
            .update()
            .in_col(collection)
            .document_id(key)
            .object(doc)
            .execute()
            .await
            .map_err(db_err)?;
        Ok(())
    }

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
        let _: T = self
            .client
            .fluent()
            .update()
            .fields(fields.iter().map(|f| f.to_string()))
            .in_col(collection)
            .document_id(key)
            .object(doc)
            .execute()
            .await
            .map_err(db_err)?;

        tracing::debug!(collection, key, ?fields, "Merge-write committed");
        Ok(())
    }

    pub async fn create_if_absent<T>(
        &self,
        collection: &str,
        key: &str,
        doc: &T,
    ) -> Result<bool, AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let result: Result<T, FirestoreError> = self
            .client
            .fluent()
            .insert()
            .into(collection)
            .document_id(key)
            .object(doc)
            .execute()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(FirestoreError::DataConflictError(_)) => Ok(false),
            Err(e) => Err(db_err(e)),
        }
    }

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
        let mut transaction = self
            .client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Reads through this handle are bound to the transaction, so a
        // concurrent write to the document aborts our commit.
        let tx_client = self
            .client
            .clone_with_consistency_selector(FirestoreConsistencySelector::Transaction(
                transaction.transaction_id().clone(),
            ));

        let current: Option<T> = tx_client
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(key)
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to read document in transaction: {}", e))
            })?;

        let (next, out) = match mutate(current) {
            Ok(v) => v,
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(e);
            }
        };

        self.client
            .fluent()
            .update()
            .fields(fields.iter().map(|f| f.to_string()))
            .in_col(collection)
            .document_id(key)
            .object(&next)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add write to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::debug!(collection, key, "Atomic update committed");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EducationRecord, ListRecord, PersonalInfoRecord, WorkRecord};
    use crate::services::records::ListDocument;
    use chrono::NaiveDate;
    use firestore::{firestore_document_from_serializable, firestore_document_to_serializable};

    /// Encode as a Firestore document and decode it the way a read does,
    /// with the `_firestore_*` metadata fields added.
    fn through_firestore<T: Serialize + DeserializeOwned>(collection: &str, doc: &T) -> T {
        let path = format!("projects/p/databases/(default)/documents/{}/u1", collection);
        let encoded = firestore_document_from_serializable(path.as_str(), doc).unwrap();
        firestore_document_to_serializable(&encoded).unwrap()
    }

    #[test]
    fn education_list_survives_firestore_codec() {
        let doc = ListDocument::new(vec![
            EducationRecord {
                id: "1742300000000".into(),
                institution: "IIT Delhi".into(),
                degree: "B.Tech".into(),
                start_date: NaiveDate::from_ymd_opt(2016, 7, 1),
                ..Default::default()
            },
            EducationRecord {
                id: "1742300000001".into(),
                degree: "M.Tech".into(),
                ..Default::default()
            },
        ]);
        assert_eq!(through_firestore(EducationRecord::COLLECTION, &doc), doc);
    }

    #[test]
    fn work_list_survives_firestore_codec() {
        let doc = ListDocument::new(vec![WorkRecord {
            id: "1742300000000".into(),
            position: "Engineer".into(),
            company: "Acme".into(),
            start_date: NaiveDate::from_ymd_opt(2021, 3, 1),
            end_date: NaiveDate::from_ymd_opt(2023, 6, 30),
            ..Default::default()
        }]);
        assert_eq!(through_firestore(WorkRecord::COLLECTION, &doc), doc);
    }

    #[test]
    fn empty_list_survives_firestore_codec() {
        let doc = ListDocument::<WorkRecord>::default();
        assert!(through_firestore(WorkRecord::COLLECTION, &doc)
            .entries
            .is_empty());
    }

    #[test]
    fn personal_info_survives_firestore_codec() {
        let record = PersonalInfoRecord {
            firstname: "Ada".into(),
            age: Some(36),
            email: "ada@example.com".into(),
            preferred_language: vec!["English".into(), "German".into()],
            interested_topic: vec!["Rust".into()],
            ..Default::default()
        };
        assert_eq!(
            through_firestore(crate::db::collections::PERSONAL_INFO, &record),
            record
        );
    }
}
