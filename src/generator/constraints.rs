//! Scalar node construction: type, missing marker and validator of a column

use crate::config::SchemaConfig;
use crate::core::error::TypeError;
use crate::core::model::Column;
use crate::core::node::{Missing, SchemaNode};
use crate::core::types::TypeRegistry;
use crate::core::validation::Constraint;
use crate::generator::GeneratorOptions;

/// Build the node of a scalar column
pub fn column_node(
    types: &TypeRegistry,
    column: &Column,
    config: &SchemaConfig,
    options: &GeneratorOptions,
) -> Result<SchemaNode, TypeError> {
    let schema_type = types.resolve(&column.storage_type)?;
    let node = SchemaNode::new(schema_type, &column.name)
        .with_missing(missing_for(column, config, options))
        .with_validator(validator_for(column, config));

    Ok(if column.nullable { node.nullable() } else { node })
}

/// Missing marker of a column
///
/// Storage default (when assigned) first, then `Absent` for columns that are
/// nullable both in storage and in configuration, then the generator's own
/// marker.
pub fn missing_for(column: &Column, config: &SchemaConfig, options: &GeneratorOptions) -> Missing {
    match &column.default {
        Some(default) if options.assign_defaults => Missing::Default(default.clone()),
        _ if column.nullable && config.is_nullable(&column.name) => Missing::Absent,
        _ => options.missing.clone(),
    }
}

/// Configured validator combined with the storage type's length limit
///
/// The length check always comes first in the resulting composite.
pub fn validator_for(column: &Column, config: &SchemaConfig) -> Option<Constraint> {
    let configured = config.validator(&column.name).cloned();
    let Some(max) = column.storage_type.max_length() else {
        return configured;
    };

    let length = Constraint::max_length(max);
    Some(match configured {
        Some(Constraint::All(members)) => {
            let mut combined = Vec::with_capacity(members.len() + 1);
            combined.push(length);
            combined.extend(members);
            Constraint::All(combined)
        }
        Some(other) => Constraint::All(vec![length, other]),
        None => length,
    })
}
