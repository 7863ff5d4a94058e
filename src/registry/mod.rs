//! Model registry: the models schema generation knows about
//!
//! The registry owns everything generation reads besides the models
//! themselves: the type mapping table and configuration overrides (for
//! instance loaded from YAML). Relation targets are resolved through it, so
//! forward references by name work once both models are registered.

pub mod presets;

pub use presets::{ModelSchemas, SchemaArgs};

use crate::config::{SchemaConfig, SchemaConfigFile};
use crate::core::error::ConfigError;
use crate::core::model::{Model, ModelRef};
use crate::core::types::TypeRegistry;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of every model that supports schema generation
#[derive(Default)]
pub struct ModelRegistry {
    models: IndexMap<String, Arc<dyn Model>>,
    overrides: HashMap<String, SchemaConfig>,
    types: TypeRegistry,
}

impl ModelRegistry {
    /// Create an empty registry using the standard type mapping table
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the type mapping table
    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Register a model
    ///
    /// The model name is used as the key; registering the same name again
    /// replaces the previous model.
    pub fn register<M: Model + 'static>(&mut self, model: M) {
        self.register_arc(Arc::new(model));
    }

    pub fn register_arc(&mut self, model: Arc<dyn Model>) {
        let name = model.model_name().to_string();
        tracing::debug!(model = %name, "Registering model");
        self.models.insert(name, model);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Model>> {
        self.models.get(name).cloned()
    }

    /// Registered model names, in registration order
    pub fn model_names(&self) -> Vec<&str> {
        self.models.keys().map(|s| s.as_str()).collect()
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Mutable access to the type mapping table
    ///
    /// Changes apply to every schema generated through this registry from
    /// then on.
    pub fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    /// Overlay configuration on a model's own, attribute by attribute
    pub fn configure(&mut self, model: impl Into<String>, config: SchemaConfig) {
        self.overrides.entry(model.into()).or_default().merge(config);
    }

    /// Apply every model section of a configuration file
    ///
    /// Every section is checked before any is applied: a section naming an
    /// unregistered model or holding an invalid validator fails the whole
    /// file and leaves the registry unchanged.
    pub fn apply_config(&mut self, file: &SchemaConfigFile) -> Result<(), ConfigError> {
        let mut sections = Vec::with_capacity(file.models.len());
        for name in file.models.keys() {
            if !self.contains(name) {
                return Err(ConfigError::UnknownModel { model: name.clone() });
            }
            if let Some(config) = file.model_config(name)? {
                sections.push((name.clone(), config));
            }
        }

        for (name, config) in sections {
            tracing::debug!(model = %name, attributes = config.names().count(), "Applying schema configuration");
            self.configure(name, config);
        }
        Ok(())
    }

    /// Parse a YAML configuration document and apply it
    pub fn apply_yaml(&mut self, yaml: &str) -> Result<(), ConfigError> {
        let file = SchemaConfigFile::from_yaml_str(yaml).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        self.apply_config(&file)
    }

    /// The model's configuration with registry overrides applied
    pub fn effective_config(&self, model: &dyn Model) -> SchemaConfig {
        let mut config = model.schema_config();
        if let Some(overrides) = self.overrides.get(model.model_name()) {
            config.merge(overrides.clone());
        }
        config
    }

    /// Resolve a relation target
    pub fn resolve(&self, target: &ModelRef) -> Result<Arc<dyn Model>, ConfigError> {
        match target {
            ModelRef::Resolved(model) if self.contains(model.model_name()) => Ok(model.clone()),
            ModelRef::Resolved(model) => Err(ConfigError::UnsupportedModel {
                model: model.model_name().to_string(),
            }),
            ModelRef::Named(name) => self
                .get(name)
                .ok_or_else(|| ConfigError::UnresolvedModel { name: name.clone() }),
        }
    }

    /// Schema presets of a registered model
    pub fn schemas(&self, model: &str) -> Result<ModelSchemas<'_>, ConfigError> {
        let model = self.get(model).ok_or_else(|| ConfigError::UnknownModel {
            model: model.to_string(),
        })?;
        Ok(ModelSchemas::new(self, model))
    }
}
