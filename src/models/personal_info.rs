// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Personal information record and the partial updates that edit it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

/// Languages offered by the preferred-language picker.
pub const LANGUAGE_CATALOG: &[&str] = &["English", "Spanish", "French", "German", "Chinese"];

/// Topics suggested by the interested-topic picker. Users may add others.
pub const SUGGESTED_TOPICS: &[&str] = &[
    "Design",
    "Marketing",
    "Sales",
    "Finance",
    "Dance",
    "Business",
];

/// Stored field names, used as merge-write masks.
pub mod fields {
    pub const CONTACT: &[&str] = &["firstname", "lastname", "age", "address", "phonenumber"];
    pub const BIO: &[&str] = &["bio"];
    pub const LANGUAGES: &[&str] = &["preferred_language"];
    pub const TOPICS: &[&str] = &["interested_topic"];
}

/// One per user, stored at `ClientInfo/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct PersonalInfoRecord {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub firstname: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub lastname: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 150))]
    pub age: Option<i32>,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub address: String,
    /// Set from the identity provider at sign-up, never rewritten.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 40))]
    pub phonenumber: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub bio: String,
    #[serde(default)]
    #[validate(custom(function = "validate_languages"))]
    pub preferred_language: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub interested_topic: Vec<String>,
    #[serde(default)]
    pub social_media: BTreeMap<String, String>,
}

fn validate_languages(languages: &[String]) -> Result<(), ValidationError> {
    match languages
        .iter()
        .find(|l| !LANGUAGE_CATALOG.contains(&l.as_str()))
    {
        Some(unknown) => {
            let mut err = ValidationError::new("unknown_language");
            err.message = Some(format!("unsupported language: {unknown}").into());
            Err(err)
        }
        None => Ok(()),
    }
}

/// Edit of the personal and contact sections. Email is deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactInfoUpdate {
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phonenumber: String,
}

impl ContactInfoUpdate {
    pub fn apply(self, record: &mut PersonalInfoRecord) {
        record.firstname = self.firstname;
        record.lastname = self.lastname;
        record.age = self.age;
        record.address = self.address;
        record.phonenumber = self.phonenumber;
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BioUpdate {
    pub bio: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguagesUpdate {
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopicsUpdate {
    pub topics: Vec<String>,
}

/// Add `tag` if absent, remove it if present.
pub fn toggle_tag(tags: &mut Vec<String>, tag: &str) {
    if let Some(pos) = tags.iter().position(|t| t == tag) {
        tags.remove(pos);
    } else {
        tags.push(tag.to_string());
    }
}

/// Trim, drop empties and de-duplicate, keeping first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}
