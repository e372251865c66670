// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod date_field;
pub mod education;
pub mod personal_info;
pub mod record_id;
pub mod session;
pub mod work;

pub use education::EducationRecord;
pub use personal_info::PersonalInfoRecord;
pub use session::UserSession;
pub use work::WorkRecord;

/// A record that lives inside a per-user list document.
///
/// The whole list is stored as one array field (`FIELD`) of the document
/// keyed by the owning user's id in `COLLECTION`.
pub trait ListRecord:
    Clone
    + Default
    + serde::Serialize
    + serde::de::DeserializeOwned
    + validator::Validate
    + Send
    + Sync
    + 'static
{
    /// Collection holding one list document per user.
    const COLLECTION: &'static str;
    /// Array field inside the list document.
    const FIELD: &'static str;
    /// Placeholder shown when the list is empty.
    const EMPTY_MESSAGE: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}
