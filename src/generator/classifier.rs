//! Decides, per attribute, whether it becomes a schema node

use crate::config::SchemaConfig;
use crate::core::model::{Attribute, Column, Index, Relation};
use crate::generator::GeneratorOptions;

/// Why an attribute produced no node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    PrimaryKey,
    ForeignKey,
    ReadOnly,
    Discriminator,
    NotIndexed,
    RelationsDisabled,
    /// Relation not listed in the model's schema configuration
    NotConfigured,
}

/// Outcome of classifying one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Scalar,
    Relation,
    Skip(SkipReason),
}

/// Classifier bound to one model's configuration and indexes
pub struct FieldClassifier<'a> {
    options: &'a GeneratorOptions,
    config: &'a SchemaConfig,
    indexes: &'a [Index],
}

impl<'a> FieldClassifier<'a> {
    pub fn new(options: &'a GeneratorOptions, config: &'a SchemaConfig, indexes: &'a [Index]) -> Self {
        Self {
            options,
            config,
            indexes,
        }
    }

    /// Classify an attribute
    ///
    /// `forced` is set for explicit includes: it lifts the column rules
    /// except read-only. Relations always need `include_relations` and an
    /// entry in the configuration.
    pub fn classify(&self, attribute: &Attribute, forced: bool) -> Classification {
        let skip = match attribute {
            Attribute::Column(column) => self.column_skip(column, forced),
            Attribute::Relation(relation) => self.relation_skip(relation),
        };
        match (skip, attribute) {
            (Some(reason), _) => Classification::Skip(reason),
            (None, Attribute::Column(_)) => Classification::Scalar,
            (None, Attribute::Relation(_)) => Classification::Relation,
        }
    }

    fn column_skip(&self, column: &Column, forced: bool) -> Option<SkipReason> {
        if self.config.is_readonly(&column.name) {
            return Some(SkipReason::ReadOnly);
        }
        if forced {
            return None;
        }
        if column.primary_key && !self.options.include_primary_keys {
            return Some(SkipReason::PrimaryKey);
        }
        if column.foreign_key.is_some() {
            return Some(SkipReason::ForeignKey);
        }
        if column.discriminator {
            return Some(SkipReason::Discriminator);
        }
        if self.options.only_indexed_fields && !self.has_index(column) {
            return Some(SkipReason::NotIndexed);
        }
        None
    }

    fn relation_skip(&self, relation: &Relation) -> Option<SkipReason> {
        if self.config.is_readonly(&relation.name) {
            return Some(SkipReason::ReadOnly);
        }
        if !self.config.contains(&relation.name) {
            return Some(SkipReason::NotConfigured);
        }
        if !self.options.include_relations {
            return Some(SkipReason::RelationsDisabled);
        }
        None
    }

    /// Primary key, foreign key, or sole column of a single-column index
    pub fn has_index(&self, column: &Column) -> bool {
        column.primary_key
            || column.foreign_key.is_some()
            || self.indexes.iter().any(|index| index.is_single_column(&column.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AttributeConfig;
    use crate::core::model::StorageType;

    fn column(name: &str) -> Column {
        Column::new(name, StorageType::Integer)
    }

    fn classify(options: &GeneratorOptions, config: &SchemaConfig, attribute: Attribute) -> Classification {
        let indexes = vec![
            Index::new("ix_single", &["code"]),
            Index::new("ix_pair", &["a", "b"]),
        ];
        FieldClassifier::new(options, config, &indexes).classify(&attribute, false)
    }

    #[test]
    fn test_plain_column_is_scalar() {
        let options = GeneratorOptions::default();
        let config = SchemaConfig::new();
        assert_eq!(classify(&options, &config, column("age").into()), Classification::Scalar);
    }

    #[test]
    fn test_primary_key_skipped_unless_enabled() {
        let config = SchemaConfig::new();
        let pk: Attribute = column("id").primary_key().into();

        let options = GeneratorOptions::default();
        assert_eq!(
            classify(&options, &config, pk.clone()),
            Classification::Skip(SkipReason::PrimaryKey)
        );

        let options = GeneratorOptions::default().with_primary_keys(true);
        assert_eq!(classify(&options, &config, pk), Classification::Scalar);
    }

    #[test]
    fn test_foreign_key_skipped_even_with_primary_keys() {
        let options = GeneratorOptions::default().with_primary_keys(true);
        let config = SchemaConfig::new();
        assert_eq!(
            classify(&options, &config, column("owner_id").foreign_key("user.id").into()),
            Classification::Skip(SkipReason::ForeignKey)
        );
    }

    #[test]
    fn test_readonly_and_discriminator_skipped() {
        let options = GeneratorOptions::default();
        let mut config = SchemaConfig::new();
        config.insert("secret", AttributeConfig::new().readonly(true));

        assert_eq!(
            classify(&options, &config, column("secret").into()),
            Classification::Skip(SkipReason::ReadOnly)
        );
        assert_eq!(
            classify(&options, &config, column("kind").discriminator().into()),
            Classification::Skip(SkipReason::Discriminator)
        );
    }

    #[test]
    fn test_only_indexed_fields() {
        let options = GeneratorOptions::default()
            .with_only_indexed_fields(true)
            .with_primary_keys(true);
        let config = SchemaConfig::new();

        assert_eq!(classify(&options, &config, column("code").into()), Classification::Scalar);
        assert_eq!(
            classify(&options, &config, column("id").primary_key().into()),
            Classification::Scalar
        );
        assert_eq!(
            classify(&options, &config, column("a").into()),
            Classification::Skip(SkipReason::NotIndexed)
        );
    }

    #[test]
    fn test_relations_are_opt_in() {
        let options = GeneratorOptions::default();
        let mut config = SchemaConfig::new();
        config.insert("owner", AttributeConfig::new());

        assert_eq!(
            classify(&options, &config, Relation::new("owner", "user").into()),
            Classification::Relation
        );
        assert_eq!(
            classify(&options, &config, Relation::new("company", "company").into()),
            Classification::Skip(SkipReason::NotConfigured)
        );

        let options = GeneratorOptions::default().with_relations(false);
        assert_eq!(
            classify(&options, &config, Relation::new("owner", "user").into()),
            Classification::Skip(SkipReason::RelationsDisabled)
        );
    }

    #[test]
    fn test_forced_include_keeps_readonly_and_relation_rules() {
        let options = GeneratorOptions::default().with_relations(false);
        let mut config = SchemaConfig::new();
        config.insert("secret", AttributeConfig::new().readonly(true));
        config.insert("owner", AttributeConfig::new());
        let classifier = FieldClassifier::new(&options, &config, &[]);

        assert_eq!(
            classifier.classify(&column("id").primary_key().into(), true),
            Classification::Scalar
        );
        assert_eq!(
            classifier.classify(&column("secret").into(), true),
            Classification::Skip(SkipReason::ReadOnly)
        );
        assert_eq!(
            classifier.classify(&Relation::new("owner", "user").into(), true),
            Classification::Skip(SkipReason::RelationsDisabled)
        );
        assert_eq!(
            classifier.classify(&Relation::new("company", "company").into(), true),
            Classification::Skip(SkipReason::NotConfigured)
        );

        let options = GeneratorOptions::default();
        let classifier = FieldClassifier::new(&options, &config, &[]);
        assert_eq!(
            classifier.classify(&Relation::new("owner", "user").into(), true),
            Classification::Relation
        );
    }
}
