//! # Model Schema
//!
//! Generates validation schemas from ORM model metadata.
//!
//! ## Features
//!
//! - **Metadata-Driven**: one mapping schema per model, built from its columns and relations
//! - **Configurable**: per-attribute `nullable`, `readonly`, validators and nested schema factories
//! - **Presets**: create, update and search schemas with their own missing/default policies
//! - **Type Mapping**: replaceable storage type → validation type table, local to a registry
//! - **Configuration-Based**: attribute options can also be loaded from YAML
//! - **Nested Relations**: opt-in relations become nested, optionally nullable, mappings
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use model_schema::prelude::*;
//!
//! let mut registry = ModelRegistry::new();
//! registry.register(
//!     ModelDefinition::new("user")
//!         .column(Column::new("id", StorageType::BigInteger).primary_key())
//!         .column(Column::new("email", StorageType::unicode(255)).not_null().indexed())
//!         .column(Column::new("age", StorageType::Integer))
//!         .config(schema_config! {
//!             "email" => { validator: Constraint::Email },
//!             "age" => { validator: Constraint::range(18, 150) },
//!         }),
//! );
//!
//! let schema = registry.schemas("user")?.get_create_schema(SchemaArgs::new())?;
//! let user = schema.deserialize_value(&serde_json::json!({"email": "ada@example.com"}))?;
//! ```

pub mod config;
pub mod core;
pub mod generator;
pub mod registry;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        error::{ConfigError, ErrorResponse, Invalid, SchemaError, TypeError, ValidationError},
        field::FieldValue,
        model::{Attribute, Column, Index, Model, ModelDefinition, ModelRef, Relation, StorageKind, StorageType},
        node::{Missing, SchemaNode, nullable},
        types::{SchemaType, TypeRegistry},
        validation::{Constraint, strip_absent, to_naive_utc},
    };

    // === Macros ===
    pub use crate::schema_config;

    // === Config ===
    pub use crate::config::{AttributeConfig, NestedSchemaArgs, SchemaConfig, SchemaConfigFile, ValidatorSpec};

    // === Generation ===
    pub use crate::generator::{GeneratorOptions, SchemaGenerator};
    pub use crate::registry::{ModelRegistry, ModelSchemas, SchemaArgs};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
    pub use rust_decimal::Decimal;
}
