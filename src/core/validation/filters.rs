//! Reusable value filters
//!
//! These transform values around deserialization: whitespace trimming for
//! stripped strings, timezone normalisation for naive datetimes, and the
//! removal of fields that were not provided.

use crate::core::field::FieldValue;
use chrono::{DateTime, FixedOffset, NaiveDateTime};

/// Trim surrounding whitespace
pub fn trim(value: &str) -> String {
    value.trim().to_string()
}

/// Convert to UTC and drop the offset
pub fn to_naive_utc(value: &DateTime<FixedOffset>) -> NaiveDateTime {
    value.naive_utc()
}

/// Copy of `value` without the keys whose value is [`FieldValue::Absent`]
///
/// Nested mappings are stripped recursively. Every other value, including
/// `Null`, `false` and `0`, is kept as is.
pub fn strip_absent(value: &FieldValue) -> FieldValue {
    match value {
        FieldValue::Mapping(map) => FieldValue::Mapping(
            map.iter()
                .filter(|(_, v)| !v.is_absent())
                .map(|(k, v)| (k.clone(), strip_absent(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}
