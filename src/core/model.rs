//! Model metadata: the capability schema generation reads from
//!
//! A [`Model`] describes one mapped entity: its attributes in declaration
//! order, its table indexes, its per-attribute schema configuration and an
//! optional model-level validation hook. Applications usually implement it
//! on top of their ORM's reflection API; [`ModelDefinition`] is a
//! declarative implementation for code that describes models by hand.

use crate::config::SchemaConfig;
use crate::core::field::FieldValue;
use std::fmt;
use std::sync::Arc;

/// Storage type families, used as keys of the type mapping table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageKind {
    BigInteger,
    SmallInteger,
    Integer,
    Float,
    Numeric,
    Boolean,
    Date,
    Time,
    DateTime,
    String,
    Text,
    Unicode,
    UnicodeText,
    /// Application-defined storage type, identified by name
    Custom(String),
}

impl StorageKind {
    /// The kind this one specializes, if any
    ///
    /// `Custom` kinds have no built-in parent; a custom [`StorageType`]
    /// declares its own.
    pub fn parent(&self) -> Option<StorageKind> {
        match self {
            StorageKind::BigInteger | StorageKind::SmallInteger => Some(StorageKind::Integer),
            StorageKind::Float => Some(StorageKind::Numeric),
            StorageKind::Text | StorageKind::Unicode => Some(StorageKind::String),
            StorageKind::UnicodeText => Some(StorageKind::Text),
            _ => None,
        }
    }
}

/// Column storage type as reported by the ORM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageType {
    BigInteger,
    SmallInteger,
    Integer,
    Float,
    Numeric {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    Boolean,
    Date,
    Time,
    DateTime {
        timezone: bool,
    },
    String {
        length: Option<usize>,
    },
    Text {
        length: Option<usize>,
    },
    Unicode {
        length: Option<usize>,
    },
    UnicodeText {
        length: Option<usize>,
    },
    Custom {
        name: String,
        extends: Option<StorageKind>,
        length: Option<usize>,
    },
}

impl StorageType {
    pub fn numeric() -> Self {
        StorageType::Numeric {
            precision: None,
            scale: None,
        }
    }

    pub fn datetime() -> Self {
        StorageType::DateTime { timezone: false }
    }

    pub fn string(length: usize) -> Self {
        StorageType::String {
            length: Some(length),
        }
    }

    pub fn text() -> Self {
        StorageType::Text { length: None }
    }

    pub fn unicode(length: usize) -> Self {
        StorageType::Unicode {
            length: Some(length),
        }
    }

    pub fn unicode_text() -> Self {
        StorageType::UnicodeText { length: None }
    }

    pub fn custom(name: impl Into<String>) -> Self {
        StorageType::Custom {
            name: name.into(),
            extends: None,
            length: None,
        }
    }

    /// A custom type that behaves like `parent` for type mapping
    pub fn custom_extending(name: impl Into<String>, parent: StorageKind) -> Self {
        StorageType::Custom {
            name: name.into(),
            extends: Some(parent),
            length: None,
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            StorageType::BigInteger => StorageKind::BigInteger,
            StorageType::SmallInteger => StorageKind::SmallInteger,
            StorageType::Integer => StorageKind::Integer,
            StorageType::Float => StorageKind::Float,
            StorageType::Numeric { .. } => StorageKind::Numeric,
            StorageType::Boolean => StorageKind::Boolean,
            StorageType::Date => StorageKind::Date,
            StorageType::Time => StorageKind::Time,
            StorageType::DateTime { .. } => StorageKind::DateTime,
            StorageType::String { .. } => StorageKind::String,
            StorageType::Text { .. } => StorageKind::Text,
            StorageType::Unicode { .. } => StorageKind::Unicode,
            StorageType::UnicodeText { .. } => StorageKind::UnicodeText,
            StorageType::Custom { name, .. } => StorageKind::Custom(name.clone()),
        }
    }

    /// Whether this type is `kind` or specializes it
    pub fn is_a(&self, kind: &StorageKind) -> bool {
        let mut current = Some(self.kind());
        let mut first = true;
        while let Some(k) = current {
            if &k == kind {
                return true;
            }
            current = match self {
                StorageType::Custom { extends, .. } if first => extends.clone(),
                _ => k.parent(),
            };
            first = false;
        }
        false
    }

    /// Maximum length carried by the type, if any
    pub fn max_length(&self) -> Option<usize> {
        match self {
            StorageType::String { length }
            | StorageType::Text { length }
            | StorageType::Unicode { length }
            | StorageType::UnicodeText { length }
            | StorageType::Custom { length, .. } => *length,
            _ => None,
        }
    }

    /// Name used in error messages
    pub fn type_name(&self) -> String {
        match self.kind() {
            StorageKind::Custom(name) => name,
            other => format!("{:?}", other),
        }
    }
}

/// A scalar column attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub storage_type: StorageType,
    pub nullable: bool,
    pub default: Option<FieldValue>,
    pub primary_key: bool,
    /// Referenced column (`table.column`) when this is a foreign key
    pub foreign_key: Option<String>,
    /// Column storing the polymorphic identity of an inheritance hierarchy
    pub discriminator: bool,
    /// Declares a single-column index on this column
    pub index: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Self {
        Self {
            name: name.into(),
            storage_type,
            nullable: true,
            default: None,
            primary_key: false,
            foreign_key: None,
            discriminator: false,
            index: false,
        }
    }

    /// Mark as primary key (implies not nullable)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn default_value(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn foreign_key(mut self, target: impl Into<String>) -> Self {
        self.foreign_key = Some(target.into());
        self
    }

    pub fn discriminator(mut self) -> Self {
        self.discriminator = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.index = true;
        self
    }
}

/// A relationship attribute pointing at another model
#[derive(Debug, Clone)]
pub struct Relation {
    pub name: String,
    pub target: ModelRef,
    /// Collection relation (one-to-many / many-to-many)
    pub uselist: bool,
}

impl Relation {
    pub fn new(name: impl Into<String>, target: impl Into<ModelRef>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            uselist: false,
        }
    }

    pub fn many(mut self) -> Self {
        self.uselist = true;
        self
    }
}

/// A model attribute
#[derive(Debug, Clone)]
pub enum Attribute {
    Column(Column),
    Relation(Relation),
}

impl Attribute {
    pub fn name(&self) -> &str {
        match self {
            Attribute::Column(c) => &c.name,
            Attribute::Relation(r) => &r.name,
        }
    }
}

impl From<Column> for Attribute {
    fn from(column: Column) -> Self {
        Attribute::Column(column)
    }
}

impl From<Relation> for Attribute {
    fn from(relation: Relation) -> Self {
        Attribute::Relation(relation)
    }
}

/// A table index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
}

impl Index {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Whether this index covers exactly the given column
    pub fn is_single_column(&self, column: &str) -> bool {
        self.columns.len() == 1 && self.columns[0] == column
    }
}

/// Reference to a relation target
///
/// `Named` is a forward reference resolved through the
/// [`ModelRegistry`](crate::registry::ModelRegistry) at generation time.
#[derive(Clone)]
pub enum ModelRef {
    Resolved(Arc<dyn Model>),
    Named(String),
}

impl ModelRef {
    pub fn resolved(model: Arc<dyn Model>) -> Self {
        ModelRef::Resolved(model)
    }

    /// Name of the referenced model
    pub fn name(&self) -> &str {
        match self {
            ModelRef::Resolved(model) => model.model_name(),
            ModelRef::Named(name) => name,
        }
    }
}

impl fmt::Debug for ModelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelRef::Resolved(model) => f.debug_tuple("Resolved").field(&model.model_name()).finish(),
            ModelRef::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

impl From<&str> for ModelRef {
    fn from(name: &str) -> Self {
        ModelRef::Named(name.to_string())
    }
}

impl From<String> for ModelRef {
    fn from(name: String) -> Self {
        ModelRef::Named(name)
    }
}

impl From<Arc<dyn Model>> for ModelRef {
    fn from(model: Arc<dyn Model>) -> Self {
        ModelRef::Resolved(model)
    }
}

/// Metadata provider for one mapped entity
pub trait Model: Send + Sync {
    /// Unique model name (e.g., "user", "invoice_line")
    fn model_name(&self) -> &str;

    /// Attributes in declaration order
    fn attributes(&self) -> &[Attribute];

    /// Indexes of the model's table
    fn indexes(&self) -> &[Index] {
        &[]
    }

    /// Per-attribute schema configuration
    ///
    /// Relations only produce nested schemas when listed here.
    fn schema_config(&self) -> SchemaConfig {
        SchemaConfig::default()
    }

    /// Model-level validation run on the whole deserialized mapping by
    /// create, update and search schemas
    fn validate(&self, _value: &FieldValue) -> Result<(), String> {
        Ok(())
    }

    /// Look up an attribute by name
    fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes().iter().find(|a| a.name() == name)
    }
}

type ValidateFn = Arc<dyn Fn(&FieldValue) -> Result<(), String> + Send + Sync>;

/// Declarative [`Model`] implementation
///
/// ```rust,ignore
/// let user = ModelDefinition::new("user")
///     .column(Column::new("id", StorageType::BigInteger).primary_key())
///     .column(Column::new("email", StorageType::unicode(255)).not_null().indexed())
///     .relation(Relation::new("company", "company"))
///     .config(schema_config! { "company" => {} });
/// ```
#[derive(Clone)]
pub struct ModelDefinition {
    name: String,
    attributes: Vec<Attribute>,
    indexes: Vec<Index>,
    config: SchemaConfig,
    validate: Option<ValidateFn>,
}

impl ModelDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            indexes: Vec::new(),
            config: SchemaConfig::default(),
            validate: None,
        }
    }

    /// Add a column; an `indexed` column also gets a single-column index
    pub fn column(mut self, column: Column) -> Self {
        if column.index {
            self.indexes.push(Index::new(
                format!("ix_{}_{}", self.name, column.name),
                &[column.name.as_str()],
            ));
        }
        self.attributes.push(Attribute::Column(column));
        self
    }

    pub fn relation(mut self, relation: Relation) -> Self {
        self.attributes.push(Attribute::Relation(relation));
        self
    }

    pub fn index(mut self, name: impl Into<String>, columns: &[&str]) -> Self {
        self.indexes.push(Index::new(name, columns));
        self
    }

    pub fn config(mut self, config: SchemaConfig) -> Self {
        self.config = config;
        self
    }

    /// Install the model-level validation hook
    pub fn validate_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&FieldValue) -> Result<(), String> + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for ModelDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelDefinition")
            .field("name", &self.name)
            .field("attributes", &self.attributes)
            .field("indexes", &self.indexes)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Model for ModelDefinition {
    fn model_name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    fn schema_config(&self) -> SchemaConfig {
        self.config.clone()
    }

    fn validate(&self, value: &FieldValue) -> Result<(), String> {
        match &self.validate {
            Some(f) => f(value),
            None => Ok(()),
        }
    }
}
