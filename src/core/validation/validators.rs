//! Reusable field validators
//!
//! Constraints run on deserialized [`FieldValue`]s. A constraint ignores
//! values of a kind it does not apply to (a length check on an integer
//! passes), so type errors are reported by the node's type alone.

use crate::core::field::FieldValue;
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use validator::{ValidateEmail, ValidateLength, ValidateUrl};

type CheckFn = Arc<dyn Fn(&FieldValue) -> Result<(), String> + Send + Sync>;

/// A validation constraint, possibly composite
#[derive(Clone)]
pub enum Constraint {
    /// String length bounds, counted in characters
    Length { min: Option<u64>, max: Option<u64> },
    /// Numeric bounds, inclusive
    Range { min: Option<f64>, max: Option<f64> },
    /// Value must equal one of the choices
    OneOf(Vec<FieldValue>),
    /// String must match the regex
    Pattern(Regex),
    Email,
    Url,
    /// Every member must pass; all messages are reported
    All(Vec<Constraint>),
    /// Application-supplied check
    Custom { name: String, check: CheckFn },
}

impl Constraint {
    pub fn max_length(max: usize) -> Self {
        Constraint::Length {
            min: None,
            max: Some(max as u64),
        }
    }

    pub fn length(min: usize, max: usize) -> Self {
        Constraint::Length {
            min: Some(min as u64),
            max: Some(max as u64),
        }
    }

    pub fn range(min: impl Into<f64>, max: impl Into<f64>) -> Self {
        Constraint::Range {
            min: Some(min.into()),
            max: Some(max.into()),
        }
    }

    pub fn one_of<I, V>(choices: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        Constraint::OneOf(choices.into_iter().map(Into::into).collect())
    }

    pub fn pattern(regex: &str) -> Result<Self, regex::Error> {
        Ok(Constraint::Pattern(Regex::new(regex)?))
    }

    pub fn all(members: Vec<Constraint>) -> Self {
        Constraint::All(members)
    }

    pub fn custom<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&FieldValue) -> Result<(), String> + Send + Sync + 'static,
    {
        Constraint::Custom {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Member constraints when this is a composite
    pub fn members(&self) -> Option<&[Constraint]> {
        match self {
            Constraint::All(members) => Some(members),
            _ => None,
        }
    }

    /// Run the constraint, collecting every failure message
    pub fn validate(&self, value: &FieldValue) -> Result<(), Vec<String>> {
        match self {
            Constraint::All(members) => {
                let messages: Vec<String> = members
                    .iter()
                    .filter_map(|m| m.validate(value).err())
                    .flatten()
                    .collect();
                if messages.is_empty() {
                    Ok(())
                } else {
                    Err(messages)
                }
            }
            other => other.check(value).map_err(|m| vec![m]),
        }
    }

    fn check(&self, value: &FieldValue) -> Result<(), String> {
        match self {
            Constraint::Length { min, max } => {
                let Some(s) = value.as_string() else {
                    return Ok(());
                };
                if s.validate_length(*min, *max, None) {
                    return Ok(());
                }
                let len = s.chars().count() as u64;
                match (min, max) {
                    (Some(min), _) if len < *min => {
                        Err(format!("Shorter than minimum length {}", min))
                    }
                    (_, Some(max)) => Err(format!("Longer than maximum length {}", max)),
                    _ => Ok(()),
                }
            }
            Constraint::Range { min, max } => {
                let Some(num) = value.as_f64() else {
                    return Ok(());
                };
                if let Some(min) = min {
                    if num < *min {
                        return Err(format!(
                            "{} is less than minimum value {}",
                            value.display(),
                            min
                        ));
                    }
                }
                if let Some(max) = max {
                    if num > *max {
                        return Err(format!(
                            "{} is greater than maximum value {}",
                            value.display(),
                            max
                        ));
                    }
                }
                Ok(())
            }
            Constraint::OneOf(choices) => {
                if choices.contains(value) {
                    Ok(())
                } else {
                    let allowed: Vec<String> = choices.iter().map(FieldValue::display).collect();
                    Err(format!(
                        "\"{}\" is not one of {}",
                        value.display(),
                        allowed.join(", ")
                    ))
                }
            }
            Constraint::Pattern(regex) => match value.as_string() {
                Some(s) if !regex.is_match(s) => {
                    Err("String does not match expected pattern".to_string())
                }
                _ => Ok(()),
            },
            Constraint::Email => match value.as_string() {
                Some(s) if !s.validate_email() => Err("Invalid email address".to_string()),
                _ => Ok(()),
            },
            Constraint::Url => match value.as_string() {
                Some(s) if !s.validate_url() => Err("Must be a URL".to_string()),
                _ => Ok(()),
            },
            Constraint::All(_) => self.validate(value).map_err(|m| m.join("; ")),
            Constraint::Custom { check, .. } => check(value),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Length { min, max } => f
                .debug_struct("Length")
                .field("min", min)
                .field("max", max)
                .finish(),
            Constraint::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            Constraint::OneOf(choices) => f.debug_tuple("OneOf").field(choices).finish(),
            Constraint::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Constraint::Email => write!(f, "Email"),
            Constraint::Url => write!(f, "Url"),
            Constraint::All(members) => f.debug_tuple("All").field(members).finish(),
            Constraint::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}
