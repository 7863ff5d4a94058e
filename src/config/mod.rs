//! Per-model schema configuration and its YAML loading
//!
//! Each model carries a [`SchemaConfig`]: a map from attribute name to
//! [`AttributeConfig`]. The recognized options are
//!
//! - `nullable` (default `true`): whether a missing/`null` value is accepted
//! - `readonly` (default `false`): never part of any generated schema
//! - `validator`: a [`Constraint`] (or composite) applied to the field
//! - `schema`: a factory building the nested schema of a relation
//!
//! Relations are opt-in: only relations whose name appears in the map get a
//! nested schema, even with an empty entry.
//!
//! The same options, minus `schema`, can be supplied from YAML:
//!
//! ```yaml
//! models:
//!   user:
//!     email:
//!       validator: { type: email }
//!     password_hash:
//!       readonly: true
//! ```

pub mod macros;

use crate::core::error::{ConfigError, SchemaError};
use crate::core::field::FieldValue;
use crate::core::node::{Missing, SchemaNode};
use crate::core::validation::Constraint;
use crate::registry::ModelRegistry;
use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Arguments handed to a relation's schema factory
#[derive(Debug, Clone, PartialEq)]
pub struct NestedSchemaArgs {
    /// Name of the relation attribute, used as the nested node's name
    pub name: String,
    /// Missing marker for the nested node
    pub missing: Missing,
    /// The parent generator's `assign_defaults`
    pub assign_defaults: bool,
}

/// Custom builder for the nested schema of a relation
pub type SchemaFactory =
    Arc<dyn Fn(&ModelRegistry, NestedSchemaArgs) -> Result<SchemaNode, SchemaError> + Send + Sync>;

/// Schema options of one attribute
#[derive(Clone, Default)]
pub struct AttributeConfig {
    pub nullable: Option<bool>,
    pub readonly: Option<bool>,
    pub validator: Option<Constraint>,
    pub schema: Option<SchemaFactory>,
}

impl AttributeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = Some(nullable);
        self
    }

    pub fn readonly(mut self, readonly: bool) -> Self {
        self.readonly = Some(readonly);
        self
    }

    pub fn validator(mut self, validator: Constraint) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn schema<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ModelRegistry, NestedSchemaArgs) -> Result<SchemaNode, SchemaError>
            + Send
            + Sync
            + 'static,
    {
        self.schema = Some(Arc::new(factory));
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable.unwrap_or(true)
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly.unwrap_or(false)
    }

    /// Overlay the options set in `other`
    pub fn merge(&mut self, other: AttributeConfig) {
        if other.nullable.is_some() {
            self.nullable = other.nullable;
        }
        if other.readonly.is_some() {
            self.readonly = other.readonly;
        }
        if other.validator.is_some() {
            self.validator = other.validator;
        }
        if other.schema.is_some() {
            self.schema = other.schema;
        }
    }
}

impl fmt::Debug for AttributeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeConfig")
            .field("nullable", &self.nullable)
            .field("readonly", &self.readonly)
            .field("validator", &self.validator)
            .field("schema", &self.schema.as_ref().map(|_| "<factory>"))
            .finish()
    }
}

/// Attribute name → options, for one model
#[derive(Debug, Clone, Default)]
pub struct SchemaConfig {
    attributes: IndexMap<String, AttributeConfig>,
}

impl SchemaConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, config: AttributeConfig) {
        self.attributes.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Option<&AttributeConfig> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(|k| k.as_str())
    }

    /// Overlay another configuration, attribute by attribute
    pub fn merge(&mut self, other: SchemaConfig) {
        for (name, config) in other.attributes {
            self.attributes.entry(name).or_default().merge(config);
        }
    }

    pub fn is_nullable(&self, name: &str) -> bool {
        self.get(name).map(AttributeConfig::is_nullable).unwrap_or(true)
    }

    pub fn is_readonly(&self, name: &str) -> bool {
        self.get(name).map(AttributeConfig::is_readonly).unwrap_or(false)
    }

    pub fn validator(&self, name: &str) -> Option<&Constraint> {
        self.get(name).and_then(|c| c.validator.as_ref())
    }

    pub fn factory(&self, name: &str) -> Option<&SchemaFactory> {
        self.get(name).and_then(|c| c.schema.as_ref())
    }
}

// =============================================================================
// YAML configuration
// =============================================================================

/// Declarative validator, as written in configuration files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorSpec {
    Length {
        #[serde(default)]
        min: Option<u64>,
        #[serde(default)]
        max: Option<u64>,
    },
    Range {
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    OneOf {
        choices: Vec<serde_json::Value>,
    },
    Pattern {
        regex: String,
    },
    Email,
    Url,
    All {
        validators: Vec<ValidatorSpec>,
    },
}

impl ValidatorSpec {
    /// Build the constraint for `field`
    pub fn build(&self, field: &str) -> Result<Constraint, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValidator {
            field: field.to_string(),
            message,
        };

        Ok(match self {
            ValidatorSpec::Length { min, max } => Constraint::Length {
                min: *min,
                max: *max,
            },
            ValidatorSpec::Range { min, max } => Constraint::Range {
                min: *min,
                max: *max,
            },
            ValidatorSpec::OneOf { choices } => Constraint::OneOf(
                choices
                    .iter()
                    .map(|choice| choice_value(choice).ok_or_else(|| invalid(format!("unsupported choice {}", choice))))
                    .collect::<Result<_, _>>()?,
            ),
            ValidatorSpec::Pattern { regex } => {
                Constraint::pattern(regex).map_err(|e| invalid(e.to_string()))?
            }
            ValidatorSpec::Email => Constraint::Email,
            ValidatorSpec::Url => Constraint::Url,
            ValidatorSpec::All { validators } => Constraint::All(
                validators
                    .iter()
                    .map(|v| v.build(field))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

fn choice_value(value: &serde_json::Value) -> Option<FieldValue> {
    match value {
        serde_json::Value::String(s) => Some(FieldValue::String(s.clone())),
        serde_json::Value::Bool(b) => Some(FieldValue::Boolean(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(FieldValue::Integer)
            .or_else(|| n.as_f64().map(FieldValue::Float)),
        _ => None,
    }
}

/// Options of one attribute in a configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator: Option<ValidatorSpec>,
}

impl AttributeSettings {
    pub fn to_config(&self, field: &str) -> Result<AttributeConfig, ConfigError> {
        Ok(AttributeConfig {
            nullable: self.nullable,
            readonly: self.readonly,
            validator: self.validator.as_ref().map(|v| v.build(field)).transpose()?,
            schema: None,
        })
    }
}

/// Schema configuration for several models
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaConfigFile {
    /// Model name → attribute name → settings
    #[serde(default)]
    pub models: IndexMap<String, IndexMap<String, AttributeSettings>>,
}

impl SchemaConfigFile {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Build the [`SchemaConfig`] of one model, if the file mentions it
    pub fn model_config(&self, model: &str) -> Result<Option<SchemaConfig>, ConfigError> {
        let Some(attributes) = self.models.get(model) else {
            return Ok(None);
        };

        let mut config = SchemaConfig::new();
        for (name, settings) in attributes {
            config.insert(name.clone(), settings.to_config(name)?);
        }
        Ok(Some(config))
    }
}
