use crate::record::GenericRecord;
use crate::schema::{FieldType, ScalarType};

/// Field value of a generic record.
///
/// `Null` marks an absent value; it is only valid for nullable fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int32(i32),
    String(String),
    Record(GenericRecord),
}

impl Value {
    /// Short type name, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int32(_) => "int32",
            Value::String(_) => "string",
            Value::Record(_) => "record",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether a non-null value carries the declared field type.
    ///
    /// For nested records only the record schema is compared here;
    /// the nested values are checked by `record::validate`.
    pub fn matches(&self, field_type: &FieldType) -> bool {
        match (self, field_type) {
            (Value::Bool(_), FieldType::Scalar(ScalarType::Bool)) => true,
            (Value::Int32(_), FieldType::Scalar(ScalarType::Int32)) => true,
            (Value::String(_), FieldType::Scalar(ScalarType::String)) => true,
            (Value::Record(r), FieldType::Record(schema)) => **r.schema() == **schema,
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&GenericRecord> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int32(i) => serde_json::json!(i),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Record(r) => r.to_json(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int32(i)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<GenericRecord> for Value {
    fn from(r: GenericRecord) -> Self {
        Value::Record(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
