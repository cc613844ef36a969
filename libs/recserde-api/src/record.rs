use std::fmt;
use std::sync::Arc;

use crate::error::SerdeError;
use crate::schema::{Field, FieldType, Schema};
use crate::value::Value;

/// Schema-tagged record, the canonical in-memory record form.
///
/// Values are positional: `values[i]` belongs to `schema.fields()[i]`.
/// Unset fields hold `Value::Null`; whether that is acceptable is decided
/// by [`validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericRecord {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl GenericRecord {
    /// Empty record: every field unset.
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = vec![Value::Null; schema.fields().len()];
        Self { schema, values }
    }

    /// Record from values in schema order.
    pub fn from_values(schema: Arc<Schema>, values: Vec<Value>) -> Result<Self, SerdeError> {
        if values.len() != schema.fields().len() {
            return Err(SerdeError::schema(format!(
                "record '{}': expected {} values, got {}",
                schema.full_name(),
                schema.fields().len(),
                values.len()
            )));
        }
        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Set a field by name. Unknown names are a `SchemaViolation`;
    /// value types are checked by [`validate`].
    pub fn put(&mut self, name: &str, value: impl Into<Value>) -> Result<(), SerdeError> {
        let idx = self.schema.index_of(name).ok_or_else(|| {
            SerdeError::schema(format!(
                "record '{}' has no field '{name}'",
                self.schema.full_name()
            ))
        })?;
        self.values[idx] = value.into();
        Ok(())
    }

    /// Value of a field, `None` if the schema does not declare it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|idx| &self.values[idx])
    }

    pub fn require_str(&self, name: &str) -> Result<&str, SerdeError> {
        let value = self.require(name)?;
        value
            .as_str()
            .ok_or_else(|| type_mismatch(&self.schema, name, "string", value))
    }

    pub fn require_bool(&self, name: &str) -> Result<bool, SerdeError> {
        let value = self.require(name)?;
        value
            .as_bool()
            .ok_or_else(|| type_mismatch(&self.schema, name, "bool", value))
    }

    pub fn require_i32(&self, name: &str) -> Result<i32, SerdeError> {
        let value = self.require(name)?;
        value
            .as_i32()
            .ok_or_else(|| type_mismatch(&self.schema, name, "int32", value))
    }

    fn require(&self, name: &str) -> Result<&Value, SerdeError> {
        match self.get(name) {
            Some(Value::Null) | None => Err(SerdeError::schema(format!(
                "record '{}': missing required field '{name}'",
                self.schema.full_name()
            ))),
            Some(value) => Ok(value),
        }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Fields paired with their values, in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&Field, &Value)> {
        self.schema.fields().iter().zip(self.values.iter())
    }

    pub fn validate(&self) -> Result<(), SerdeError> {
        validate(&self.schema, self)
    }

    /// JSON rendering, as generic records print. Keys keep schema order.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(field, value)| (field.name.clone(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl fmt::Display for GenericRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Check `record` against `schema`.
///
/// Every required field must be present with a value of the declared type;
/// nullable fields may be `Null`. Nested records are checked recursively.
/// A record carrying fields the schema does not declare is also rejected.
pub fn validate(schema: &Schema, record: &GenericRecord) -> Result<(), SerdeError> {
    for field in schema.fields() {
        let value = match record.get(&field.name) {
            Some(v) => v,
            None if field.nullable => continue,
            None => {
                return Err(SerdeError::schema(format!(
                    "record '{}': missing required field '{}'",
                    schema.full_name(),
                    field.name
                )));
            }
        };

        if value.is_null() {
            if field.is_required() {
                return Err(SerdeError::schema(format!(
                    "record '{}': missing required field '{}'",
                    schema.full_name(),
                    field.name
                )));
            }
            continue;
        }

        match (&field.field_type, value) {
            (FieldType::Record(nested), Value::Record(inner)) => {
                validate(nested, inner)
                    .map_err(|e| e.with_context(format!("field '{}'", field.name)))?;
            }
            (field_type, value) if value.matches(field_type) => {}
            (field_type, value) => {
                return Err(SerdeError::schema(format!(
                    "record '{}': field '{}' expects {field_type}, got {}",
                    schema.full_name(),
                    field.name,
                    value.type_name()
                )));
            }
        }
    }

    for field in record.schema().fields() {
        if schema.field(&field.name).is_none() {
            return Err(SerdeError::schema(format!(
                "record '{}': unexpected field '{}'",
                schema.full_name(),
                field.name
            )));
        }
    }

    Ok(())
}

fn type_mismatch(schema: &Schema, name: &str, expected: &str, value: &Value) -> SerdeError {
    SerdeError::schema(format!(
        "record '{}': field '{name}' expects {expected}, got {}",
        schema.full_name(),
        value.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn card_schema() -> Arc<Schema> {
        Arc::new(
            Schema::builder("credit_card")
                .required_string("name")
                .required_bool("blocked")
                .optional_string("note")
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn complete_record_is_valid() {
        let mut record = GenericRecord::new(card_schema());
        record.put("name", "John Snow").unwrap();
        record.put("blocked", false).unwrap();
        assert!(record.validate().is_ok());
    }

    #[test]
    fn missing_required_field() {
        let mut record = GenericRecord::new(card_schema());
        record.put("name", "John Snow").unwrap();
        let err = record.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert!(err.message().contains("'blocked'"));
    }

    #[test]
    fn wrong_value_type() {
        let mut record = GenericRecord::new(card_schema());
        record.put("name", 42).unwrap();
        record.put("blocked", false).unwrap();
        let err = record.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert!(err.message().contains("expects string, got int32"));
    }

    #[test]
    fn unknown_field_is_rejected_on_put() {
        let mut record = GenericRecord::new(card_schema());
        let err = record.put("cvv", "123").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    }

    #[test]
    fn nested_record_is_validated() {
        let owner = Schema::builder("owner").required_string("name").build().unwrap();
        let schema = Arc::new(
            Schema::builder("account")
                .required_record("owner", owner.clone())
                .build()
                .unwrap(),
        );

        let mut record = GenericRecord::new(schema);
        record.put("owner", GenericRecord::new(Arc::new(owner))).unwrap();
        let err = record.validate().unwrap_err();
        assert_eq!(err.message(), "field 'owner': record 'owner': missing required field 'name'");
    }

    #[test]
    fn record_of_other_schema_is_rejected() {
        let other = Arc::new(Schema::builder("other").required_string("name").build().unwrap());
        let mut record = GenericRecord::new(other);
        record.put("name", "x").unwrap();
        assert!(validate(&card_schema(), &record).is_err());
    }

    #[test]
    fn renders_as_json() {
        let mut record = GenericRecord::new(card_schema());
        record.put("name", "John Snow").unwrap();
        record.put("blocked", true).unwrap();
        assert_eq!(record.to_string(), r#"{"name":"John Snow","blocked":true,"note":null}"#);
    }

    #[test]
    fn renders_nested_fields_in_schema_order() {
        let owner = Schema::builder("owner")
            .required_string("surname")
            .required_string("given")
            .build()
            .unwrap();
        let schema = Arc::new(
            Schema::builder("account")
                .required_string("number")
                .required_record("owner", owner.clone())
                .required_bool("active")
                .build()
                .unwrap(),
        );
        let mut holder = GenericRecord::new(Arc::new(owner));
        holder.put("surname", "Snow").unwrap();
        holder.put("given", "John").unwrap();
        let mut record = GenericRecord::new(schema);
        record.put("number", "1111").unwrap();
        record.put("owner", holder).unwrap();
        record.put("active", false).unwrap();

        assert_eq!(
            record.to_string(),
            r#"{"number":"1111","owner":{"surname":"Snow","given":"John"},"active":false}"#
        );
    }
}
