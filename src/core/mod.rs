//! Core module containing the model metadata, schema node and validation types

pub mod error;
pub mod field;
pub mod model;
pub mod node;
pub mod types;
pub mod validation;

pub use error::{ConfigError, ErrorResponse, Invalid, SchemaError, TypeError, ValidationError};
pub use field::FieldValue;
pub use model::{Attribute, Column, Index, Model, ModelDefinition, ModelRef, Relation, StorageKind, StorageType};
pub use node::{Missing, SchemaNode, nullable};
pub use types::{SchemaType, TypeRegistry};
pub use validation::{Constraint, strip_absent, to_naive_utc};
