// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Serde adapter for optional calendar dates.
//!
//! Stored documents use `"YYYY-MM-DD"` for a set date and `""` for an
//! unset one (what an empty `<input type="date">` produces). `null` and a
//! missing field also read as unset.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serializer};

const FORMAT: &str = "%Y-%m-%d";

pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(d) => serializer.serialize_str(&d.format(FORMAT).to_string()),
        None => serializer.serialize_str(""),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, FORMAT)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Start must not be after end when both are set.
pub fn check_order(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), validator::ValidationError> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => {
            let mut err = validator::ValidationError::new("date_order");
            err.message = Some("start date must not be after end date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}
