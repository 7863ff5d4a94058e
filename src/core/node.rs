//! Schema nodes and deserialization

use crate::core::error::Invalid;
use crate::core::field::FieldValue;
use crate::core::types::SchemaType;
use crate::core::validation::Constraint;
use indexmap::IndexMap;
use serde_json::Value;

/// What a node yields when its input carries no value
#[derive(Debug, Clone, PartialEq)]
pub enum Missing {
    /// Fail with a "Required" error
    Required,
    /// Yield [`FieldValue::Absent`]
    Absent,
    /// Yield this value, without running validators
    Default(FieldValue),
}

/// One unit of a validation schema
///
/// Scalar nodes deserialize through their [`SchemaType`]; mapping nodes
/// deserialize each child in order under its name.
#[derive(Debug, Clone)]
pub struct SchemaNode {
    name: String,
    schema_type: SchemaType,
    missing: Missing,
    validator: Option<Constraint>,
    nullable: bool,
    children: IndexMap<String, SchemaNode>,
}

impl SchemaNode {
    pub fn new(schema_type: SchemaType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema_type,
            missing: Missing::Required,
            validator: None,
            nullable: false,
            children: IndexMap::new(),
        }
    }

    pub fn mapping(name: impl Into<String>) -> Self {
        Self::new(SchemaType::Mapping, name)
    }

    pub fn with_missing(mut self, missing: Missing) -> Self {
        self.missing = missing;
        self
    }

    pub fn with_validator(mut self, validator: Option<Constraint>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Treat `null` and `""` input as an explicit `Null`, skipping the type
    /// and validators entirely
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Add or replace a child, keyed by its name
    pub fn add(&mut self, node: SchemaNode) {
        self.children.insert(node.name.clone(), node);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_type(&self) -> SchemaType {
        self.schema_type
    }

    pub fn missing(&self) -> &Missing {
        &self.missing
    }

    pub fn validator(&self) -> Option<&Constraint> {
        self.validator.as_ref()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn children(&self) -> &IndexMap<String, SchemaNode> {
        &self.children
    }

    pub fn child(&self, name: &str) -> Option<&SchemaNode> {
        self.children.get(name)
    }

    /// Deserialize and validate raw input
    ///
    /// `None` means the value was not provided at all.
    pub fn deserialize(&self, input: Option<&Value>) -> Result<FieldValue, Invalid> {
        if self.nullable && is_null_input(input) {
            return Ok(FieldValue::Null);
        }

        let value = match (self.schema_type, input) {
            (SchemaType::Mapping, _) => self.deserialize_mapping(input)?,
            (schema_type, Some(raw)) => schema_type.deserialize(&self.name, raw)?,
            (_, None) => None,
        };

        let Some(value) = value else {
            return match &self.missing {
                Missing::Required => Err(Invalid::new(&self.name, "Required")),
                Missing::Absent => Ok(FieldValue::Absent),
                Missing::Default(default) => Ok(default.clone()),
            };
        };

        if let Some(validator) = &self.validator {
            validator
                .validate(&value)
                .map_err(|messages| Invalid::with_messages(&self.name, messages))?;
        }

        Ok(value)
    }

    /// Shorthand for deserializing a present value
    pub fn deserialize_value(&self, input: &Value) -> Result<FieldValue, Invalid> {
        self.deserialize(Some(input))
    }

    fn deserialize_mapping(&self, input: Option<&Value>) -> Result<Option<FieldValue>, Invalid> {
        let object = match input {
            None => return Ok(None),
            Some(Value::Object(object)) => object,
            Some(other) => {
                return Err(Invalid::new(
                    &self.name,
                    format!("\"{}\" is not a mapping type", other),
                ));
            }
        };

        let mut result = IndexMap::with_capacity(self.children.len());
        let mut errors = Vec::new();
        for (name, child) in &self.children {
            match child.deserialize(object.get(name)) {
                Ok(value) => {
                    result.insert(name.clone(), value);
                }
                Err(invalid) => errors.push(invalid),
            }
        }

        if !errors.is_empty() {
            return Err(Invalid::with_children(&self.name, errors));
        }
        Ok(Some(FieldValue::Mapping(result)))
    }
}

fn is_null_input(input: Option<&Value>) -> bool {
    match input {
        Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}

/// Wrap an existing node so that `null` or `""` input yields `Null`
/// without running its own deserialization
///
/// ```rust,ignore
/// let mut person = SchemaNode::mapping("person");
/// person.add(nullable(phone_number_schema()));
/// ```
pub fn nullable(node: SchemaNode) -> SchemaNode {
    node.nullable()
}
