//! Schema generation from model metadata
//!
//! [`SchemaGenerator`] walks a model's attributes in declaration order and
//! builds one mapping [`SchemaNode`]:
//!
//! - columns go through the [`classifier`] and then the [`constraints`]
//!   deriver, which picks the validation type from the registry's
//!   [`TypeRegistry`](crate::core::types::TypeRegistry)
//! - configured relations become nested mapping nodes built from the target
//!   model (or the relation's own factory)
//!
//! Generation either returns the whole tree or fails; nothing is cached.

pub mod classifier;
pub mod constraints;

use crate::config::{NestedSchemaArgs, SchemaConfig};
use crate::core::error::{ConfigError, SchemaError};
use crate::core::model::{Attribute, Model, Relation};
use crate::core::node::{Missing, SchemaNode};
use crate::core::validation::Constraint;
use crate::registry::ModelRegistry;
use classifier::{Classification, FieldClassifier};
use std::sync::Arc;

/// Generation policy, fixed when the generator is built
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Missing marker for required fields and for the root node
    pub missing: Missing,
    /// Turn storage defaults into the node's missing value
    pub assign_defaults: bool,
    /// Validator of the generated mapping itself
    pub validator: Option<Constraint>,
    /// Keep only primary keys, foreign keys and singly-indexed columns
    pub only_indexed_fields: bool,
    pub include_primary_keys: bool,
    pub include_relations: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            missing: Missing::Required,
            assign_defaults: true,
            validator: None,
            only_indexed_fields: false,
            include_primary_keys: false,
            include_relations: true,
        }
    }
}

impl GeneratorOptions {
    pub fn with_missing(mut self, missing: Missing) -> Self {
        self.missing = missing;
        self
    }

    pub fn with_assign_defaults(mut self, assign_defaults: bool) -> Self {
        self.assign_defaults = assign_defaults;
        self
    }

    pub fn with_validator(mut self, validator: Option<Constraint>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_only_indexed_fields(mut self, only_indexed_fields: bool) -> Self {
        self.only_indexed_fields = only_indexed_fields;
        self
    }

    pub fn with_primary_keys(mut self, include_primary_keys: bool) -> Self {
        self.include_primary_keys = include_primary_keys;
        self
    }

    pub fn with_relations(mut self, include_relations: bool) -> Self {
        self.include_relations = include_relations;
        self
    }
}

/// Builds the validation schema of one model
pub struct SchemaGenerator<'r> {
    registry: &'r ModelRegistry,
    model: Arc<dyn Model>,
    config: SchemaConfig,
    options: GeneratorOptions,
    /// Models whose generation is in progress above this one
    ancestors: Vec<String>,
}

impl<'r> SchemaGenerator<'r> {
    pub fn new(registry: &'r ModelRegistry, model: Arc<dyn Model>, options: GeneratorOptions) -> Self {
        let config = registry.effective_config(model.as_ref());
        Self {
            registry,
            model,
            config,
            options,
            ancestors: Vec::new(),
        }
    }

    fn with_ancestors(mut self, ancestors: Vec<String>) -> Self {
        self.ancestors = ancestors;
        self
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Generate the schema
    ///
    /// `include` forces columns in even when they would be skipped
    /// (read-only columns excepted); relations still need to be configured
    /// and enabled by `include_relations`. `exclude`
    /// removes attributes. Empty slices change nothing. Children keep the
    /// model's declaration order.
    pub fn create(&self, include: &[&str], exclude: &[&str], name: &str) -> Result<SchemaNode, SchemaError> {
        let model_name = self.model.model_name();

        if let Some(unknown) = include.iter().find(|n| self.model.attribute(n).is_none()) {
            return Err(ConfigError::UnknownAttribute {
                model: model_name.to_string(),
                attribute: unknown.to_string(),
            }
            .into());
        }

        let mut schema = SchemaNode::mapping(name)
            .with_missing(self.options.missing.clone())
            .with_validator(self.options.validator.clone());
        let classifier = FieldClassifier::new(&self.options, &self.config, self.model.indexes());

        for attribute in self.model.attributes() {
            let field = attribute.name();
            if exclude.iter().any(|excluded| *excluded == field) {
                tracing::debug!(model = %model_name, field = %field, "Attribute excluded");
                continue;
            }

            let forced = include.iter().any(|included| *included == field);
            let node = match (classifier.classify(attribute, forced), attribute) {
                (Classification::Skip(reason), _) => {
                    tracing::debug!(model = %model_name, field = %field, reason = ?reason, "Skipping attribute");
                    continue;
                }
                (Classification::Scalar, Attribute::Column(column)) => {
                    constraints::column_node(self.registry.types(), column, &self.config, &self.options)?
                }
                (Classification::Relation, Attribute::Relation(relation)) => self.relation_node(relation)?,
                _ => continue,
            };

            tracing::trace!(
                model = %model_name,
                field = %field,
                schema_type = ?node.schema_type(),
                nullable = node.is_nullable(),
                "Generated node"
            );
            schema.add(node);
        }

        tracing::debug!(
            model = %model_name,
            fields = schema.children().len(),
            "Generated schema"
        );
        Ok(schema)
    }

    fn relation_node(&self, relation: &Relation) -> Result<SchemaNode, SchemaError> {
        let model_name = self.model.model_name();
        if relation.uselist {
            return Err(ConfigError::UnsupportedRelation {
                model: model_name.to_string(),
                relation: relation.name.clone(),
            }
            .into());
        }

        let target = self.registry.resolve(&relation.target)?;
        let nullable = self.config.is_nullable(&relation.name);
        let missing = if nullable {
            Missing::Absent
        } else {
            self.options.missing.clone()
        };

        let node = match self.config.factory(&relation.name) {
            Some(factory) => factory(
                self.registry,
                NestedSchemaArgs {
                    name: relation.name.clone(),
                    missing,
                    assign_defaults: self.options.assign_defaults,
                },
            )?,
            None => {
                let target_name = target.model_name().to_string();
                let mut path = self.ancestors.clone();
                path.push(model_name.to_string());
                if path.contains(&target_name) {
                    path.push(target_name);
                    return Err(ConfigError::RecursiveRelation { path }.into());
                }

                SchemaGenerator::new(self.registry, target, GeneratorOptions::default().with_missing(missing))
                    .with_ancestors(path)
                    .create(&[], &[], &relation.name)?
            }
        };

        Ok(if nullable { node.nullable() } else { node })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttributeConfig;
    use crate::core::model::{Column, ModelDefinition, StorageType};
    use crate::core::types::SchemaType;
    use serde_json::json;

    fn registry() -> ModelRegistry {
        let mut registry = ModelRegistry::new();
        registry.register(
            ModelDefinition::new("address")
                .column(Column::new("id", StorageType::BigInteger).primary_key())
                .column(Column::new("street", StorageType::unicode(100)).not_null())
                .column(Column::new("city", StorageType::unicode(50))),
        );
        registry.register(
            ModelDefinition::new("person")
                .column(Column::new("id", StorageType::BigInteger).primary_key())
                .column(Column::new("name", StorageType::unicode(50)).not_null())
                .column(Column::new("address_id", StorageType::BigInteger).foreign_key("address.id"))
                .relation(Relation::new("address", "address"))
                .relation(Relation::new("billing_address", "address"))
                .config(crate::schema_config! {
                    "address" => {},
                    "billing_address" => { nullable: false },
                }),
        );
        registry
    }

    fn generator(registry: &ModelRegistry, options: GeneratorOptions) -> SchemaGenerator<'_> {
        let model = registry.get("person").expect("person is registered");
        SchemaGenerator::new(registry, model, options)
    }

    #[test]
    fn test_declaration_order() {
        let registry = registry();
        let schema = generator(&registry, GeneratorOptions::default())
            .create(&[], &[], "person")
            .unwrap();

        assert_eq!(schema.name(), "person");
        assert_eq!(
            schema.children().keys().collect::<Vec<_>>(),
            vec!["name", "address", "billing_address"]
        );
    }

    #[test]
    fn test_include_forces_keys_in_declaration_order() {
        let registry = registry();
        let schema = generator(&registry, GeneratorOptions::default())
            .create(&["address_id", "id"], &[], "")
            .unwrap();

        assert_eq!(
            schema.children().keys().collect::<Vec<_>>(),
            vec!["id", "name", "address_id", "address", "billing_address"]
        );
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let registry = registry();
        let schema = generator(&registry, GeneratorOptions::default())
            .create(&["id"], &["id", "address"], "")
            .unwrap();

        assert!(schema.child("id").is_none());
        assert!(schema.child("address").is_none());
        assert!(schema.child("name").is_some());
    }

    #[test]
    fn test_unknown_include_is_error() {
        let registry = registry();
        let err = generator(&registry, GeneratorOptions::default())
            .create(&["nickname"], &[], "")
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Config(ConfigError::UnknownAttribute { ref attribute, .. }) if attribute == "nickname"
        ));
    }

    #[test]
    fn test_nested_relation_schema() {
        let registry = registry();
        let schema = generator(&registry, GeneratorOptions::default())
            .create(&[], &[], "")
            .unwrap();

        let address = schema.child("address").unwrap();
        assert_eq!(address.schema_type(), SchemaType::Mapping);
        assert_eq!(address.missing(), &Missing::Absent);
        assert!(address.is_nullable());
        assert_eq!(
            address.children().keys().collect::<Vec<_>>(),
            vec!["street", "city"]
        );

        let billing = schema.child("billing_address").unwrap();
        assert_eq!(billing.missing(), &Missing::Required);
        assert!(!billing.is_nullable());
    }

    #[test]
    fn test_relations_disabled() {
        let registry = registry();
        let schema = generator(&registry, GeneratorOptions::default().with_relations(false))
            .create(&[], &[], "")
            .unwrap();
        assert!(schema.child("address").is_none());
    }

    #[test]
    fn test_root_carries_missing_and_validator() {
        let registry = registry();
        let options = GeneratorOptions::default()
            .with_missing(Missing::Absent)
            .with_validator(Some(Constraint::custom("noop", |_| Ok(()))));
        let schema = generator(&registry, options).create(&[], &[], "").unwrap();

        assert_eq!(schema.missing(), &Missing::Absent);
        assert!(schema.validator().is_some());
    }

    #[test]
    fn test_custom_factory_receives_arguments() {
        let mut registry = registry();
        registry.configure(
            "person",
            crate::schema_config! {
                "address" => {
                    schema: |_: &ModelRegistry, args: NestedSchemaArgs| {
                        assert_eq!(args.missing, Missing::Absent);
                        assert!(args.assign_defaults);
                        let mut node = SchemaNode::mapping(args.name).with_missing(args.missing);
                        node.add(SchemaNode::new(SchemaType::String, "line"));
                        Ok(node)
                    }
                },
            },
        );

        let schema = generator(&registry, GeneratorOptions::default())
            .create(&[], &[], "")
            .unwrap();
        let address = schema.child("address").unwrap();
        assert!(address.child("line").is_some());
        assert!(address.is_nullable());
        assert_eq!(address.deserialize_value(&json!(null)), Ok(crate::core::field::FieldValue::Null));
    }

    #[test]
    fn test_unregistered_target_is_config_error() {
        let mut registry = ModelRegistry::new();
        let audit: Arc<dyn Model> = Arc::new(ModelDefinition::new("audit_log"));
        registry.register(
            ModelDefinition::new("event")
                .relation(Relation::new("audit", audit))
                .config(crate::schema_config! { "audit" => {} }),
        );

        let model = registry.get("event").unwrap();
        let err = SchemaGenerator::new(&registry, model, GeneratorOptions::default())
            .create(&[], &[], "")
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Config(ConfigError::UnsupportedModel { ref model }) if model == "audit_log"
        ));
    }

    #[test]
    fn test_plural_relation_is_rejected_when_configured() {
        let mut registry = registry();
        registry.register(
            ModelDefinition::new("household")
                .relation(Relation::new("members", "person").many())
                .config(crate::schema_config! { "members" => {} }),
        );

        let model = registry.get("household").unwrap();
        let err = SchemaGenerator::new(&registry, model, GeneratorOptions::default())
            .create(&[], &[], "")
            .unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_RELATION");
    }

    #[test]
    fn test_recursive_relation_detected() {
        let mut registry = ModelRegistry::new();
        registry.register(
            ModelDefinition::new("category")
                .column(Column::new("name", StorageType::unicode(40)))
                .relation(Relation::new("parent", "category"))
                .config(crate::schema_config! { "parent" => {} }),
        );

        let model = registry.get("category").unwrap();
        let err = SchemaGenerator::new(&registry, model, GeneratorOptions::default())
            .create(&[], &[], "")
            .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Config(ConfigError::RecursiveRelation { ref path }) if path == &vec!["category".to_string(), "category".to_string()]
        ));
    }

    #[test]
    fn test_readonly_relation_config_via_registry() {
        let mut registry = registry();
        let mut overrides = SchemaConfig::new();
        overrides.insert("address", AttributeConfig::new().readonly(true));
        registry.configure("person", overrides);

        let schema = generator(&registry, GeneratorOptions::default())
            .create(&["address"], &[], "")
            .unwrap();
        assert!(schema.child("address").is_none());
    }
}
