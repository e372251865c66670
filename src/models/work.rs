// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Work experience entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{date_field, ListRecord};

/// One work entry, stored in the `work` array of `Work/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_dates"))]
pub struct WorkRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub position: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub company: String,
    #[serde(default, with = "date_field")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "date_field")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub employment_type: String,
    #[serde(default)]
    #[validate(length(max = 100))]
    pub industry: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub location: String,
}

fn validate_dates(record: &WorkRecord) -> Result<(), ValidationError> {
    date_field::check_order(record.start_date, record.end_date)
}

impl ListRecord for WorkRecord {
    const COLLECTION: &'static str = crate::db::collections::WORK;
    const FIELD: &'static str = "work";
    const EMPTY_MESSAGE: &'static str = "No work experience added yet.";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
