use std::collections::HashSet;
use std::fmt;

use crate::error::SerdeError;

// ════════════════════════════════════════════════════════════════
//  Scalar Type
// ════════════════════════════════════════════════════════════════

/// Primitive types a record field can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Bool,
    Int32,
    String,
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarType::Bool => write!(f, "bool"),
            ScalarType::Int32 => write!(f, "int32"),
            ScalarType::String => write!(f, "string"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Field Type
// ════════════════════════════════════════════════════════════════

/// Field type: a scalar or a nested record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Scalar(ScalarType),
    Record(Box<Schema>),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{s}"),
            FieldType::Record(schema) => write!(f, "record<{}>", schema.full_name()),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Field & Schema
// ════════════════════════════════════════════════════════════════

/// A single field in a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    /// Non-nullable fields are required: a record must carry a value for them.
    pub nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable,
        }
    }

    /// Shortcut: required scalar field.
    pub fn scalar(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(scalar), false)
    }

    /// Shortcut: nullable scalar field.
    pub fn scalar_nullable(name: impl Into<String>, scalar: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(scalar), true)
    }

    /// Shortcut: required nested record field.
    pub fn record(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, FieldType::Record(Box::new(schema)), false)
    }

    pub fn is_required(&self) -> bool {
        !self.nullable
    }
}

/// Ordered, named and typed description of a generic record.
///
/// Immutable once built. Equality is structural: two schemas built
/// independently from the same declarations compare equal.
///
/// Field position in `fields` is the value position inside a `GenericRecord`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    namespace: Option<String>,
    fields: Vec<Field>,
}

impl Schema {
    /// Build a schema from a field list.
    ///
    /// Fails with `SchemaViolation` on an empty record name, an empty field
    /// name or a field name declared twice.
    pub fn new(
        name: impl Into<String>,
        namespace: Option<String>,
        fields: Vec<Field>,
    ) -> Result<Self, SerdeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SerdeError::schema("record name must not be empty"));
        }

        let mut seen = HashSet::with_capacity(fields.len());
        for field in &fields {
            if field.name.is_empty() {
                return Err(SerdeError::schema(format!(
                    "record '{name}': field name must not be empty"
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(SerdeError::schema(format!(
                    "record '{name}': duplicate field '{}'",
                    field.name
                )));
            }
        }

        Ok(Self {
            name,
            namespace: namespace.filter(|ns| !ns.is_empty()),
            fields,
        })
    }

    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            namespace: None,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// `namespace.name`, or just `name` without a namespace.
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field (and of its value in a record).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.full_name())?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, " {}: {}", field.name, field.field_type)?;
            if field.nullable {
                f.write_str("?")?;
            }
        }
        f.write_str(" }")
    }
}

/// Fluent schema construction, in the style of record schema builders:
///
/// ```
/// use recserde_api::schema::Schema;
///
/// let schema = Schema::builder("credit_card")
///     .required_string("name")
///     .required_bool("blocked")
///     .build()
///     .unwrap();
/// assert_eq!(schema.fields().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    name: String,
    namespace: Option<String>,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn required_string(self, name: impl Into<String>) -> Self {
        self.field(Field::scalar(name, ScalarType::String))
    }

    pub fn required_bool(self, name: impl Into<String>) -> Self {
        self.field(Field::scalar(name, ScalarType::Bool))
    }

    pub fn required_int(self, name: impl Into<String>) -> Self {
        self.field(Field::scalar(name, ScalarType::Int32))
    }

    pub fn optional_string(self, name: impl Into<String>) -> Self {
        self.field(Field::scalar_nullable(name, ScalarType::String))
    }

    pub fn required_record(self, name: impl Into<String>, schema: Schema) -> Self {
        self.field(Field::record(name, schema))
    }

    pub fn build(self) -> Result<Schema, SerdeError> {
        Schema::new(self.name, self.namespace, self.fields)
    }
}
