//! Named schema presets of a model
//!
//! | preset              | missing    | assign_defaults | model hook |
//! |---------------------|------------|-----------------|------------|
//! | `schema`            | `Required` | `true`          | no         |
//! | `get_create_schema` | `Required` | `true`          | yes        |
//! | `get_update_schema` | `Absent`   | `false`         | yes        |
//! | `get_search_schema` | `Absent`   | `false`         | yes        |
//!
//! The search preset additionally keeps only primary keys, foreign keys and
//! singly-indexed columns, and never nests relations.

use crate::core::error::SchemaError;
use crate::core::model::Model;
use crate::core::node::{Missing, SchemaNode};
use crate::core::validation::Constraint;
use crate::generator::{GeneratorOptions, SchemaGenerator};
use crate::registry::ModelRegistry;
use std::sync::Arc;

/// Per-call arguments of a preset
///
/// `missing` and `assign_defaults` fall back to the preset's own defaults
/// when left unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaArgs {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub name: String,
    pub missing: Option<Missing>,
    pub assign_defaults: Option<bool>,
}

impl SchemaArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn missing(mut self, missing: Missing) -> Self {
        self.missing = Some(missing);
        self
    }

    pub fn assign_defaults(mut self, assign_defaults: bool) -> Self {
        self.assign_defaults = Some(assign_defaults);
        self
    }
}

/// Presets of one registered model, obtained from
/// [`ModelRegistry::schemas`]
pub struct ModelSchemas<'r> {
    registry: &'r ModelRegistry,
    model: Arc<dyn Model>,
}

impl<'r> ModelSchemas<'r> {
    pub(crate) fn new(registry: &'r ModelRegistry, model: Arc<dyn Model>) -> Self {
        Self { registry, model }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Plain schema, also used for nested relations
    pub fn schema(&self, args: SchemaArgs) -> Result<SchemaNode, SchemaError> {
        let options = Self::options(&args, Missing::Required, true);
        self.generate(args, options)
    }

    pub fn get_create_schema(&self, args: SchemaArgs) -> Result<SchemaNode, SchemaError> {
        let options = Self::options(&args, Missing::Required, true).with_validator(Some(self.hook()));
        self.generate(args, options)
    }

    /// Schema for partial updates: every field may be left out
    pub fn get_update_schema(&self, args: SchemaArgs) -> Result<SchemaNode, SchemaError> {
        let options = Self::options(&args, Missing::Absent, false).with_validator(Some(self.hook()));
        self.generate(args, options)
    }

    /// Schema of search filters over key and indexed columns
    pub fn get_search_schema(&self, args: SchemaArgs) -> Result<SchemaNode, SchemaError> {
        let options = Self::options(&args, Missing::Absent, false)
            .with_validator(Some(self.hook()))
            .with_only_indexed_fields(true)
            .with_primary_keys(true)
            .with_relations(false);
        self.generate(args, options)
    }

    fn options(args: &SchemaArgs, missing: Missing, assign_defaults: bool) -> GeneratorOptions {
        GeneratorOptions::default()
            .with_missing(args.missing.clone().unwrap_or(missing))
            .with_assign_defaults(args.assign_defaults.unwrap_or(assign_defaults))
    }

    fn hook(&self) -> Constraint {
        let model = self.model.clone();
        Constraint::custom(format!("{}.validate", model.model_name()), move |value| {
            model.validate(value)
        })
    }

    fn generate(&self, args: SchemaArgs, options: GeneratorOptions) -> Result<SchemaNode, SchemaError> {
        let include: Vec<&str> = args.include.iter().map(String::as_str).collect();
        let exclude: Vec<&str> = args.exclude.iter().map(String::as_str).collect();
        SchemaGenerator::new(self.registry, self.model.clone(), options).create(&include, &exclude, &args.name)
    }
}
