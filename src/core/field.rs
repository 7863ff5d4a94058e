//! Field value types produced by schema deserialization

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

/// A polymorphic field value produced by deserializing input through a
/// [`SchemaNode`](crate::core::node::SchemaNode)
///
/// `Null` is an explicit "no value" (the input was `null` or an empty string
/// on a nullable node). `Absent` means the field was not provided at all and
/// the node's missing marker asked for it to be left out; see
/// [`strip_absent`](crate::core::validation::filters::strip_absent).
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Boolean(bool),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(DateTime<FixedOffset>),
    NaiveDateTime(NaiveDateTime),
    Mapping(IndexMap<String, FieldValue>),
    Null,
    Absent,
}

impl FieldValue {
    /// Get the value as a string if possible
    pub fn as_string(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if possible
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float, widening integers and decimals
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Get the nested mapping if this is one
    pub fn as_mapping(&self) -> Option<&IndexMap<String, FieldValue>> {
        match self {
            FieldValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a child value of a mapping
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Check if the value is the "not provided" marker
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Short human-readable rendering used in validation messages
    pub(crate) fn display(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Integer(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Decimal(d) => d.to_string(),
            FieldValue::Boolean(b) => b.to_string(),
            FieldValue::Date(d) => d.to_string(),
            FieldValue::Time(t) => t.to_string(),
            FieldValue::DateTime(dt) => dt.to_rfc3339(),
            FieldValue::NaiveDateTime(dt) => dt.to_string(),
            FieldValue::Mapping(_) => "{...}".to_string(),
            FieldValue::Null => "null".to_string(),
            FieldValue::Absent => "<absent>".to_string(),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        FieldValue::Decimal(value)
    }
}
