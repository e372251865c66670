// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Education history entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{date_field, ListRecord};

/// One education entry, stored in the `education` array of `Education/{uid}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_dates"))]
pub struct EducationRecord {
    /// Time-based id, unique within the user's list. Empty for a new entry.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub institution: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub degree: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub field_of_study: String,
    #[serde(default, with = "date_field")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, with = "date_field")]
    pub end_date: Option<NaiveDate>,
}

fn validate_dates(record: &EducationRecord) -> Result<(), ValidationError> {
    date_field::check_order(record.start_date, record.end_date)
}

impl ListRecord for EducationRecord {
    const COLLECTION: &'static str = crate::db::collections::EDUCATION;
    const FIELD: &'static str = "education";
    const EMPTY_MESSAGE: &'static str = "No education details added yet.";

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_stored_document_shape() {
        let json = r#"{
            "id": "1742300000000",
            "institution": "IIT Delhi",
            "degree": "B.Tech",
            "fieldOfStudy": "Computer Science",
            "startDate": "2016-07-01",
            "endDate": ""
        }"#;
        let record: EducationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.field_of_study, "Computer Science");
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2016, 7, 1));
        assert_eq!(record.end_date, None);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["fieldOfStudy"], "Computer Science");
        assert_eq!(back["endDate"], "");
    }

    #[test]
    fn rejects_end_before_start() {
        let record = EducationRecord {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2019, 1, 1),
            ..Default::default()
        };
        assert!(record.validate().is_err());
    }

    #[test]
    fn empty_fields_are_accepted() {
        assert!(EducationRecord::default().validate().is_ok());
    }
}
