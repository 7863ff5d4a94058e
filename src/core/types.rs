//! Validation types and the storage-to-validation type mapping table

use crate::core::error::{Invalid, TypeError};
use crate::core::field::FieldValue;
use crate::core::model::{StorageKind, StorageType};
use crate::core::validation::filters;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Validation primitive attached to a [`SchemaNode`](crate::core::node::SchemaNode)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaType {
    Integer,
    Float,
    Decimal,
    Boolean,
    String,
    /// String trimmed of surrounding whitespace after deserialization
    StrippedString,
    Date,
    Time,
    DateTime,
    /// DateTime converted to UTC with the offset dropped
    NaiveDateTime,
    Mapping,
}

impl SchemaType {
    /// Deserialize a raw scalar value
    ///
    /// Returns `Ok(None)` when the input carries no value (`null` or an empty
    /// string); the caller decides what "no value" means for the node.
    /// Mappings are deserialized by the node itself.
    pub fn deserialize(&self, field: &str, input: &Value) -> Result<Option<FieldValue>, Invalid> {
        if is_empty_input(input) {
            return Ok(None);
        }

        let value = match self {
            SchemaType::Integer => FieldValue::Integer(parse_integer(input).ok_or_else(|| {
                Invalid::new(field, format!("\"{}\" is not a number", raw(input)))
            })?),
            SchemaType::Float => FieldValue::Float(parse_float(input).ok_or_else(|| {
                Invalid::new(field, format!("\"{}\" is not a number", raw(input)))
            })?),
            SchemaType::Decimal => FieldValue::Decimal(parse_decimal(input).ok_or_else(|| {
                Invalid::new(field, format!("\"{}\" is not a number", raw(input)))
            })?),
            SchemaType::Boolean => FieldValue::Boolean(parse_boolean(input).ok_or_else(|| {
                Invalid::new(field, format!("\"{}\" is not a boolean", raw(input)))
            })?),
            SchemaType::String => FieldValue::String(parse_string(field, input)?),
            SchemaType::StrippedString => {
                FieldValue::String(filters::trim(&parse_string(field, input)?))
            }
            SchemaType::Date => FieldValue::Date(
                input
                    .as_str()
                    .and_then(parse_date)
                    .ok_or_else(|| Invalid::new(field, "Invalid date"))?,
            ),
            SchemaType::Time => FieldValue::Time(
                input
                    .as_str()
                    .and_then(parse_time)
                    .ok_or_else(|| Invalid::new(field, "Invalid time"))?,
            ),
            SchemaType::DateTime => FieldValue::DateTime(
                input
                    .as_str()
                    .and_then(parse_datetime)
                    .ok_or_else(|| Invalid::new(field, "Invalid date"))?,
            ),
            SchemaType::NaiveDateTime => FieldValue::NaiveDateTime(
                input
                    .as_str()
                    .and_then(parse_datetime)
                    .map(|dt| filters::to_naive_utc(&dt))
                    .ok_or_else(|| Invalid::new(field, "Invalid date"))?,
            ),
            SchemaType::Mapping => {
                return Err(Invalid::new(field, "Mapping values are deserialized by their node"));
            }
        };

        Ok(Some(value))
    }
}

fn is_empty_input(input: &Value) -> bool {
    match input {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn raw(input: &Value) -> String {
    match input {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 2^63, exactly representable as f64
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn parse_integer(input: &Value) -> Option<i64> {
    match input {
        Value::Number(n) if n.is_f64() => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= -I64_BOUND && *f < I64_BOUND)
            .map(|f| f as i64),
        // integers outside the i64 range (u64 above i64::MAX) are rejected
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_float(input: &Value) -> Option<f64> {
    match input {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_decimal(input: &Value) -> Option<Decimal> {
    let text = match input {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn parse_boolean(input: &Value) -> Option<bool> {
    match input {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => {
            let lowered = s.trim().to_lowercase();
            Some(!(lowered == "false" || lowered == "0"))
        }
        _ => None,
    }
}

fn parse_string(field: &str, input: &Value) -> Result<String, Invalid> {
    match input {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(Invalid::new(field, format!("\"{}\" is not a string", other))),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date_naive()))
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Parse an ISO 8601 datetime; inputs without an offset are taken as UTC
pub(crate) fn parse_datetime(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Ordered mapping from storage kinds to validation types
///
/// Lookup walks the entries in order and returns the first one the storage
/// type "is a" (see [`StorageType::is_a`]). `Float` is matched by exact kind
/// before the walk since it is also a `Numeric`.
///
/// The table belongs to whoever owns it, normally a
/// [`ModelRegistry`](crate::registry::ModelRegistry). Overrides made through
/// [`register`](Self::register) apply to every later generation using that
/// registry and to nothing else.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    entries: Vec<(StorageKind, SchemaType)>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl TypeRegistry {
    /// The built-in table
    pub fn standard() -> Self {
        Self {
            entries: vec![
                (StorageKind::BigInteger, SchemaType::Integer),
                (StorageKind::SmallInteger, SchemaType::Integer),
                (StorageKind::Integer, SchemaType::Integer),
                (StorageKind::DateTime, SchemaType::DateTime),
                (StorageKind::Date, SchemaType::Date),
                (StorageKind::Time, SchemaType::Time),
                (StorageKind::Text, SchemaType::String),
                (StorageKind::Unicode, SchemaType::String),
                (StorageKind::UnicodeText, SchemaType::String),
                (StorageKind::Float, SchemaType::Float),
                (StorageKind::Numeric, SchemaType::Decimal),
                (StorageKind::Boolean, SchemaType::Boolean),
            ],
        }
    }

    /// A table without any entry
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register or override the validation type of a storage kind
    ///
    /// An existing entry keeps its position in the lookup order; a new kind
    /// is appended. Returns the type it replaced.
    pub fn register(&mut self, kind: StorageKind, schema_type: SchemaType) -> Option<SchemaType> {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == kind) {
            tracing::debug!(kind = ?kind, from = ?entry.1, to = ?schema_type, "Overriding type mapping");
            return Some(std::mem::replace(&mut entry.1, schema_type));
        }
        tracing::debug!(kind = ?kind, to = ?schema_type, "Registering type mapping");
        self.entries.push((kind, schema_type));
        None
    }

    /// The validation type registered for exactly this kind
    pub fn get(&self, kind: &StorageKind) -> Option<SchemaType> {
        self.entries
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, t)| *t)
    }

    /// Resolve the validation type of a storage type
    pub fn resolve(&self, storage_type: &StorageType) -> Result<SchemaType, TypeError> {
        if storage_type.kind() == StorageKind::Float {
            if let Some(schema_type) = self.get(&StorageKind::Float) {
                return Ok(schema_type);
            }
        }

        self.entries
            .iter()
            .find(|(kind, _)| storage_type.is_a(kind))
            .map(|(_, schema_type)| *schema_type)
            .ok_or_else(|| TypeError::Unknown {
                type_name: storage_type.type_name(),
            })
    }

    /// Entries in lookup order
    pub fn entries(&self) -> impl Iterator<Item = (&StorageKind, &SchemaType)> {
        self.entries.iter().map(|(k, t)| (k, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // === TypeRegistry ===

    #[test]
    fn test_integer_family_maps_to_integer() {
        let types = TypeRegistry::standard();
        assert_eq!(types.resolve(&StorageType::BigInteger), Ok(SchemaType::Integer));
        assert_eq!(types.resolve(&StorageType::SmallInteger), Ok(SchemaType::Integer));
        assert_eq!(types.resolve(&StorageType::Integer), Ok(SchemaType::Integer));
    }

    #[test]
    fn test_float_maps_to_float_not_decimal() {
        let types = TypeRegistry::standard();
        assert_eq!(types.resolve(&StorageType::Float), Ok(SchemaType::Float));
        assert_eq!(types.resolve(&StorageType::numeric()), Ok(SchemaType::Decimal));
    }

    #[test]
    fn test_float_exact_match_wins_over_order() {
        let mut types = TypeRegistry::empty();
        types.register(StorageKind::Numeric, SchemaType::Decimal);
        types.register(StorageKind::Float, SchemaType::Float);
        assert_eq!(types.resolve(&StorageType::Float), Ok(SchemaType::Float));
    }

    #[test]
    fn test_string_family_maps_to_string() {
        let types = TypeRegistry::standard();
        assert_eq!(types.resolve(&StorageType::text()), Ok(SchemaType::String));
        assert_eq!(types.resolve(&StorageType::unicode(255)), Ok(SchemaType::String));
        assert_eq!(types.resolve(&StorageType::unicode_text()), Ok(SchemaType::String));
    }

    #[test]
    fn test_plain_string_is_unknown() {
        let types = TypeRegistry::standard();
        let err = types.resolve(&StorageType::string(40)).unwrap_err();
        assert_eq!(
            err,
            TypeError::Unknown {
                type_name: "String".to_string()
            }
        );
    }

    #[test]
    fn test_custom_type_is_unknown_unless_registered() {
        let mut types = TypeRegistry::standard();
        let geometry = StorageType::custom("Geometry");
        assert!(types.resolve(&geometry).is_err());

        types.register(StorageKind::Custom("Geometry".into()), SchemaType::String);
        assert_eq!(types.resolve(&geometry), Ok(SchemaType::String));
    }

    #[test]
    fn test_custom_type_inherits_parent_mapping() {
        let types = TypeRegistry::standard();
        let money = StorageType::custom_extending("Money", StorageKind::Numeric);
        assert_eq!(types.resolve(&money), Ok(SchemaType::Decimal));
    }

    #[test]
    fn test_override_replaces_in_place() {
        let mut types = TypeRegistry::standard();
        let previous = types.register(StorageKind::DateTime, SchemaType::NaiveDateTime);
        assert_eq!(previous, Some(SchemaType::DateTime));
        assert_eq!(types.resolve(&StorageType::datetime()), Ok(SchemaType::NaiveDateTime));
        assert_eq!(types.entries().count(), 12);
    }

    // === SchemaType::deserialize ===

    #[test]
    fn test_empty_input_is_no_value() {
        assert_eq!(SchemaType::Integer.deserialize("n", &json!(null)), Ok(None));
        assert_eq!(SchemaType::String.deserialize("s", &json!("")), Ok(None));
    }

    #[test]
    fn test_integer_parsing() {
        assert_eq!(
            SchemaType::Integer.deserialize("n", &json!(42)),
            Ok(Some(FieldValue::Integer(42)))
        );
        assert_eq!(
            SchemaType::Integer.deserialize("n", &json!("17")),
            Ok(Some(FieldValue::Integer(17)))
        );
        assert_eq!(
            SchemaType::Integer.deserialize("n", &json!(3.0)),
            Ok(Some(FieldValue::Integer(3)))
        );
        let err = SchemaType::Integer.deserialize("n", &json!("abc")).unwrap_err();
        assert_eq!(err.messages, vec!["\"abc\" is not a number".to_string()]);
    }

    #[test]
    fn test_integer_out_of_range_is_rejected() {
        assert_eq!(
            SchemaType::Integer.deserialize("n", &json!(i64::MAX)),
            Ok(Some(FieldValue::Integer(i64::MAX)))
        );
        assert_eq!(
            SchemaType::Integer.deserialize("n", &json!(i64::MIN)),
            Ok(Some(FieldValue::Integer(i64::MIN)))
        );

        let err = SchemaType::Integer
            .deserialize("n", &json!(9_223_372_036_854_775_808u64))
            .unwrap_err();
        assert_eq!(
            err.messages,
            vec!["\"9223372036854775808\" is not a number".to_string()]
        );
        assert!(SchemaType::Integer.deserialize("n", &json!(9.3e18)).is_err());
        assert!(
            SchemaType::Integer
                .deserialize("n", &json!("9223372036854775808"))
                .is_err()
        );
    }

    #[test]
    fn test_decimal_parsing_keeps_precision() {
        let value = SchemaType::Decimal.deserialize("price", &json!("19.99")).unwrap();
        assert_eq!(value, Some(FieldValue::Decimal(Decimal::from_str("19.99").unwrap())));
    }

    #[test]
    fn test_boolean_parsing() {
        assert_eq!(
            SchemaType::Boolean.deserialize("b", &json!(true)),
            Ok(Some(FieldValue::Boolean(true)))
        );
        assert_eq!(
            SchemaType::Boolean.deserialize("b", &json!("false")),
            Ok(Some(FieldValue::Boolean(false)))
        );
        assert_eq!(
            SchemaType::Boolean.deserialize("b", &json!("0")),
            Ok(Some(FieldValue::Boolean(false)))
        );
        assert_eq!(
            SchemaType::Boolean.deserialize("b", &json!("yes")),
            Ok(Some(FieldValue::Boolean(true)))
        );
        assert!(SchemaType::Boolean.deserialize("b", &json!([1])).is_err());
    }

    #[test]
    fn test_string_rejects_objects() {
        assert_eq!(
            SchemaType::String.deserialize("s", &json!(12)),
            Ok(Some(FieldValue::String("12".into())))
        );
        assert!(SchemaType::String.deserialize("s", &json!({"a": 1})).is_err());
    }

    #[test]
    fn test_stripped_string_trims() {
        assert_eq!(
            SchemaType::StrippedString.deserialize("s", &json!("  ada  ")),
            Ok(Some(FieldValue::String("ada".into())))
        );
    }

    #[test]
    fn test_date_and_time_parsing() {
        assert_eq!(
            SchemaType::Date.deserialize("d", &json!("2024-01-15")),
            Ok(Some(FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())))
        );
        assert_eq!(
            SchemaType::Time.deserialize("t", &json!("08:30")),
            Ok(Some(FieldValue::Time(NaiveTime::from_hms_opt(8, 30, 0).unwrap())))
        );
        assert!(SchemaType::Date.deserialize("d", &json!("15/01/2024")).is_err());
    }

    #[test]
    fn test_datetime_keeps_offset() {
        let value = SchemaType::DateTime
            .deserialize("at", &json!("2024-01-15T10:00:00+02:00"))
            .unwrap();
        let Some(FieldValue::DateTime(dt)) = value else {
            panic!("expected a datetime");
        };
        assert_eq!(dt.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_naive_datetime_normalizes_to_utc() {
        let value = SchemaType::NaiveDateTime
            .deserialize("at", &json!("2024-01-15T10:00:00+02:00"))
            .unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        assert_eq!(value, Some(FieldValue::NaiveDateTime(expected)));
    }

    #[test]
    fn test_naive_datetime_malformed_fails_like_datetime() {
        let naive = SchemaType::NaiveDateTime.deserialize("at", &json!("yesterday")).unwrap_err();
        let aware = SchemaType::DateTime.deserialize("at", &json!("yesterday")).unwrap_err();
        assert_eq!(naive, aware);
    }
}
