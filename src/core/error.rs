//! Typed error handling for schema generation and deserialization
//!
//! # Error Categories
//!
//! - [`TypeError`]: a storage type has no entry in the type mapping table
//! - [`ConfigError`]: a model, relation or configuration file is unusable
//! - [`ValidationError`]: input data failed a generated schema
//!
//! Generation never returns a partial schema: it either produces the whole
//! node tree or fails with one of the errors above.
//!
//! # Example
//!
//! ```rust,ignore
//! match registry.schemas("user")?.schema(SchemaArgs::new()) {
//!     Ok(schema) => println!("{} fields", schema.children().len()),
//!     Err(SchemaError::Type(TypeError::Unknown { type_name })) => {
//!         eprintln!("register a mapping for {}", type_name);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The main error type of the crate
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Type mapping errors
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Model and configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Error response structure, ready to be serialized by an outer layer
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl SchemaError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            SchemaError::Type(e) => e.error_code(),
            SchemaError::Config(e) => e.error_code(),
            SchemaError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            SchemaError::Type(TypeError::Unknown { type_name }) => {
                Some(serde_json::json!({ "type": type_name }))
            }
            SchemaError::Config(ConfigError::UnknownAttribute { model, attribute }) => {
                Some(serde_json::json!({ "model": model, "attribute": attribute }))
            }
            SchemaError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

// =============================================================================
// Type Errors
// =============================================================================

/// Errors raised while mapping storage types to validation types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// No entry of the type mapping table matches the storage type
    #[error("Unknown type {type_name:?}")]
    Unknown { type_name: String },
}

impl TypeError {
    pub fn error_code(&self) -> &'static str {
        match self {
            TypeError::Unknown { .. } => "UNKNOWN_TYPE",
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to models, relations and configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A relation targets a model that was never registered for schema generation
    #[error("Could not create schema for {model:?}: model is not registered")]
    UnsupportedModel { model: String },

    /// A forward reference names no registered model
    #[error("Could not resolve model reference {name:?}")]
    UnresolvedModel { name: String },

    /// Schema requested for an unregistered model name
    #[error("Unknown model {model:?}")]
    UnknownModel { model: String },

    /// An include names an attribute the model does not have
    #[error("Model {model:?} has no attribute {attribute:?}")]
    UnknownAttribute { model: String, attribute: String },

    /// Only singular relations can be turned into nested schemas
    #[error("Relation {relation:?} of {model:?} is a collection, only singular relations are supported")]
    UnsupportedRelation { model: String, relation: String },

    /// Nested schema generation came back to a model already being generated
    #[error("Recursive relation: {}", .path.join(" -> "))]
    RecursiveRelation { path: Vec<String> },

    /// A declarative validator could not be built
    #[error("Invalid validator for field {field:?}: {message}")]
    InvalidValidator { field: String, message: String },

    /// Failed to parse a configuration document
    #[error("Failed to parse config: {message}")]
    ParseError { message: String },
}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::UnsupportedModel { .. } => "UNSUPPORTED_MODEL",
            ConfigError::UnresolvedModel { .. } => "UNRESOLVED_MODEL",
            ConfigError::UnknownModel { .. } => "UNKNOWN_MODEL",
            ConfigError::UnknownAttribute { .. } => "UNKNOWN_ATTRIBUTE",
            ConfigError::UnsupportedRelation { .. } => "UNSUPPORTED_RELATION",
            ConfigError::RecursiveRelation { .. } => "RECURSIVE_RELATION",
            ConfigError::InvalidValidator { .. } => "INVALID_VALIDATOR",
            ConfigError::ParseError { .. } => "CONFIG_PARSE_ERROR",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more fields failed validation
    #[error("Validation errors: {}", format_field_errors(.0))]
    FieldErrors(Vec<FieldValidationError>),
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

fn format_field_errors(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Deserialization failure of one node, with the failures of its children
///
/// The tree mirrors the schema: a mapping node that fails because of its
/// children carries no messages of its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalid {
    pub field: String,
    pub messages: Vec<String>,
    pub children: Vec<Invalid>,
}

impl Invalid {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            messages: vec![message.into()],
            children: Vec::new(),
        }
    }

    pub(crate) fn with_messages(field: impl Into<String>, messages: Vec<String>) -> Self {
        Self {
            field: field.into(),
            messages,
            children: Vec::new(),
        }
    }

    pub(crate) fn with_children(field: impl Into<String>, children: Vec<Invalid>) -> Self {
        Self {
            field: field.into(),
            messages: Vec::new(),
            children,
        }
    }

    /// Flatten the tree into dotted paths, messages joined by `"; "`
    ///
    /// The root node's name is not part of the paths.
    pub fn as_dict(&self) -> IndexMap<String, String> {
        let mut out = IndexMap::new();
        self.collect(None, &mut out);
        out
    }

    fn collect(&self, prefix: Option<&str>, out: &mut IndexMap<String, String>) {
        if !self.messages.is_empty() {
            let key = prefix.unwrap_or(&self.field).to_string();
            out.insert(key, self.messages.join("; "));
        }
        for child in &self.children {
            let path = match prefix {
                Some(p) if !p.is_empty() => format!("{}.{}", p, child.field),
                _ => child.field.clone(),
            };
            child.collect(Some(&path), out);
        }
    }

    fn summary(&self) -> String {
        self.as_dict()
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Invalid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

impl std::error::Error for Invalid {}

impl From<Invalid> for ValidationError {
    fn from(invalid: Invalid) -> Self {
        ValidationError::FieldErrors(
            invalid
                .as_dict()
                .into_iter()
                .map(|(field, message)| FieldValidationError { field, message })
                .collect(),
        )
    }
}

impl From<Invalid> for SchemaError {
    fn from(invalid: Invalid) -> Self {
        SchemaError::Validation(invalid.into())
    }
}
