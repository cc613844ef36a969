//! Generic binary record encoding.
//!
//! Records are written as Avro binary datums against the Avro rendering of
//! their schema: fields in schema order, zig-zag varints for integers,
//! length-prefixed strings, a union index in front of nullable fields.

use std::collections::HashSet;
use std::sync::Arc;

use apache_avro::types::Value as AvroValue;
use apache_avro::Schema as AvroSchema;

use crate::error::SerdeError;
use crate::message::{DescribedMessage, FieldValue};
use crate::record::{self, GenericRecord};
use crate::schema::{Field, FieldType, ScalarType, Schema};
use crate::value::Value;

// ═══════════════════════════════════════════════════════════════
//  Schema → Avro
// ═══════════════════════════════════════════════════════════════

/// Render a record schema as an Avro schema.
pub fn avro_schema(schema: &Schema) -> Result<AvroSchema, SerdeError> {
    let mut defined = HashSet::new();
    let json = record_json(schema, None, &mut defined);
    AvroSchema::parse_str(&json.to_string())
        .map_err(|e| SerdeError::schema(format!("avro schema for '{}': {e}", schema.full_name())))
}

/// `enclosing` is the namespace a nested record inherits when it has none.
/// A record that was already defined is referenced by its full name.
fn record_json(
    schema: &Schema,
    enclosing: Option<&str>,
    defined: &mut HashSet<String>,
) -> serde_json::Value {
    let namespace = schema.namespace().or(enclosing);
    let full_name = match namespace {
        Some(ns) => format!("{ns}.{}", schema.name()),
        None => schema.name().to_string(),
    };
    if !defined.insert(full_name.clone()) {
        return serde_json::Value::String(full_name);
    }

    let fields: Vec<serde_json::Value> = schema
        .fields()
        .iter()
        .map(|field| {
            let ty = field_type_json(&field.field_type, namespace, defined);
            let ty = if field.nullable {
                serde_json::json!(["null", ty])
            } else {
                ty
            };
            serde_json::json!({ "name": field.name, "type": ty })
        })
        .collect();

    let mut record = serde_json::json!({
        "type": "record",
        "name": schema.name(),
        "fields": fields,
    });
    if let (Some(ns), Some(obj)) = (namespace, record.as_object_mut()) {
        obj.insert("namespace".to_string(), serde_json::Value::String(ns.to_string()));
    }
    record
}

fn field_type_json(
    field_type: &FieldType,
    enclosing: Option<&str>,
    defined: &mut HashSet<String>,
) -> serde_json::Value {
    match field_type {
        FieldType::Scalar(ScalarType::Bool) => serde_json::json!("boolean"),
        FieldType::Scalar(ScalarType::Int32) => serde_json::json!("int"),
        FieldType::Scalar(ScalarType::String) => serde_json::json!("string"),
        FieldType::Record(nested) => record_json(nested, enclosing, defined),
    }
}

// ═══════════════════════════════════════════════════════════════
//  GenericDatumWriter
// ═══════════════════════════════════════════════════════════════

/// Schema-driven binary encoder.
pub struct GenericDatumWriter {
    schema: Arc<Schema>,
    avro: AvroSchema,
}

impl GenericDatumWriter {
    pub fn new(schema: Arc<Schema>) -> Result<Self, SerdeError> {
        let avro = avro_schema(&schema)?;
        Ok(Self { schema, avro })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Encode a generic record. The record is validated against the writer
    /// schema first.
    pub fn write(&self, record: &GenericRecord) -> Result<Vec<u8>, SerdeError> {
        record::validate(&self.schema, record)?;
        let value = record_to_avro(&self.schema, record);
        apache_avro::to_avro_datum(&self.avro, value)
            .map_err(|e| SerdeError::schema(format!("avro encode: {e}")))
    }

    /// Encode a typed message field by field, in the order its descriptor
    /// declares. The writer schema must be the one derived for `M`.
    pub fn write_message<M: DescribedMessage>(&self, message: &M) -> Result<Vec<u8>, SerdeError> {
        let descriptor = M::descriptor();
        if descriptor.full_name != self.schema.full_name() {
            return Err(SerdeError::schema(format!(
                "message '{}' does not match writer schema '{}'",
                descriptor.full_name,
                self.schema.full_name()
            )));
        }
        let value = message_to_avro(&self.schema, message.field_values())?;
        apache_avro::to_avro_datum(&self.avro, value)
            .map_err(|e| SerdeError::schema(format!("avro encode: {e}")))
    }
}

/// Fields are taken from `schema`, values looked up by name in `record`.
/// Union wrapping follows the nullability declared by `schema`, which may
/// differ from the record's own schema.
fn record_to_avro(schema: &Schema, record: &GenericRecord) -> AvroValue {
    AvroValue::Record(
        schema
            .fields()
            .iter()
            .map(|field| {
                let value = match (&field.field_type, record.get(&field.name)) {
                    (FieldType::Record(nested), Some(Value::Record(inner))) => {
                        record_to_avro(nested, inner)
                    }
                    (_, Some(value)) => value_to_avro(value),
                    (_, None) => AvroValue::Null,
                };
                (field.name.clone(), field_to_avro(field, value))
            })
            .collect(),
    )
}

fn value_to_avro(value: &Value) -> AvroValue {
    match value {
        Value::Null => AvroValue::Null,
        Value::Bool(b) => AvroValue::Boolean(*b),
        Value::Int32(i) => AvroValue::Int(*i),
        Value::String(s) => AvroValue::String(s.clone()),
        Value::Record(r) => record_to_avro(r.schema(), r),
    }
}

/// Wrap a nullable field's value in its `["null", T]` union branch.
fn field_to_avro(field: &Field, value: AvroValue) -> AvroValue {
    if !field.nullable {
        return value;
    }
    match value {
        AvroValue::Null => AvroValue::Union(0, Box::new(AvroValue::Null)),
        other => AvroValue::Union(1, Box::new(other)),
    }
}

fn message_to_avro(schema: &Schema, values: Vec<FieldValue<'_>>) -> Result<AvroValue, SerdeError> {
    if values.len() != schema.fields().len() {
        return Err(SerdeError::schema(format!(
            "message '{}': expected {} field values, got {}",
            schema.full_name(),
            schema.fields().len(),
            values.len()
        )));
    }

    let mut fields = Vec::with_capacity(values.len());
    for (field, value) in schema.fields().iter().zip(values) {
        let avro = match (&field.field_type, value) {
            (FieldType::Scalar(ScalarType::Bool), FieldValue::Bool(b)) => AvroValue::Boolean(b),
            (FieldType::Scalar(ScalarType::Int32), FieldValue::Int32(i)) => AvroValue::Int(i),
            (FieldType::Scalar(ScalarType::String), FieldValue::String(s)) => {
                AvroValue::String(s.to_string())
            }
            (FieldType::Record(nested), FieldValue::Message(inner)) => message_to_avro(nested, inner)?,
            (field_type, _) => {
                return Err(SerdeError::schema(format!(
                    "message '{}': field '{}' does not hold a {field_type}",
                    schema.full_name(),
                    field.name
                )));
            }
        };
        fields.push((field.name.clone(), field_to_avro(field, avro)));
    }
    Ok(AvroValue::Record(fields))
}

// ═══════════════════════════════════════════════════════════════
//  GenericDatumReader
// ═══════════════════════════════════════════════════════════════

/// Schema-driven binary decoder, the counterpart of [`GenericDatumWriter`].
pub struct GenericDatumReader {
    schema: Arc<Schema>,
    avro: AvroSchema,
}

impl GenericDatumReader {
    pub fn new(schema: Arc<Schema>) -> Result<Self, SerdeError> {
        let avro = avro_schema(&schema)?;
        Ok(Self { schema, avro })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Decode one record. The whole buffer must be consumed.
    pub fn read(&self, bytes: &[u8]) -> Result<GenericRecord, SerdeError> {
        let mut reader = bytes;
        let value = apache_avro::from_avro_datum(&self.avro, &mut reader, None)
            .map_err(|e| SerdeError::malformed(format!("avro decode: {e}")))?;
        if !reader.is_empty() {
            return Err(SerdeError::malformed(format!(
                "avro decode: {} trailing bytes",
                reader.len()
            )));
        }
        avro_to_record(&self.schema, value)
    }
}

fn avro_to_record(schema: &Arc<Schema>, value: AvroValue) -> Result<GenericRecord, SerdeError> {
    let AvroValue::Record(entries) = value else {
        return Err(SerdeError::malformed(format!(
            "avro decode: expected record '{}'",
            schema.full_name()
        )));
    };
    if entries.len() != schema.fields().len() {
        return Err(SerdeError::malformed(format!(
            "avro decode: record '{}' has {} fields, expected {}",
            schema.full_name(),
            entries.len(),
            schema.fields().len()
        )));
    }

    let mut values = Vec::with_capacity(entries.len());
    for (field, (name, value)) in schema.fields().iter().zip(entries) {
        if name != field.name {
            return Err(SerdeError::malformed(format!(
                "avro decode: expected field '{}', found '{name}'",
                field.name
            )));
        }
        values.push(avro_to_value(&field.field_type, value)?);
    }
    GenericRecord::from_values(Arc::clone(schema), values)
}

fn avro_to_value(field_type: &FieldType, value: AvroValue) -> Result<Value, SerdeError> {
    match (field_type, value) {
        (_, AvroValue::Union(_, inner)) => avro_to_value(field_type, *inner),
        (_, AvroValue::Null) => Ok(Value::Null),
        (FieldType::Scalar(ScalarType::Bool), AvroValue::Boolean(b)) => Ok(Value::Bool(b)),
        (FieldType::Scalar(ScalarType::Int32), AvroValue::Int(i)) => Ok(Value::Int32(i)),
        (FieldType::Scalar(ScalarType::String), AvroValue::String(s)) => Ok(Value::String(s)),
        (FieldType::Record(nested), value @ AvroValue::Record(_)) => {
            let nested = Arc::new(Schema::clone(nested));
            Ok(Value::Record(avro_to_record(&nested, value)?))
        }
        (field_type, other) => Err(SerdeError::malformed(format!(
            "avro decode: {other:?} is not a {field_type}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn account_schema() -> Arc<Schema> {
        let address = Schema::builder("Address")
            .required_string("city")
            .required_int("zip")
            .build()
            .unwrap();
        Arc::new(
            Schema::builder("Account")
                .namespace("bank")
                .required_string("owner")
                .required_bool("active")
                .optional_string("note")
                .required_record("address", address)
                .build()
                .unwrap(),
        )
    }

    fn account(note: Option<&str>) -> GenericRecord {
        let schema = account_schema();
        let FieldType::Record(address_schema) = &schema.fields()[3].field_type else {
            unreachable!()
        };
        let mut address = GenericRecord::new(Arc::new(Schema::clone(address_schema)));
        address.put("city", "Oslo").unwrap();
        address.put("zip", 150).unwrap();

        let mut record = GenericRecord::new(schema);
        record.put("owner", "ann").unwrap();
        record.put("active", true).unwrap();
        record.put("note", note).unwrap();
        record.put("address", address).unwrap();
        record
    }

    #[test]
    fn nested_record_round_trip() {
        let writer = GenericDatumWriter::new(account_schema()).unwrap();
        let reader = GenericDatumReader::new(account_schema()).unwrap();

        for note in [None, Some("vip")] {
            let record = account(note);
            let bytes = writer.write(&record).unwrap();
            assert_eq!(reader.read(&bytes).unwrap(), record);
        }
    }

    #[test]
    fn encoding_is_deterministic_and_ordered() {
        let schema = Arc::new(
            Schema::builder("pair").required_string("a").required_bool("b").build().unwrap(),
        );
        let writer = GenericDatumWriter::new(Arc::clone(&schema)).unwrap();
        let mut record = GenericRecord::new(schema);
        record.put("a", "hi").unwrap();
        record.put("b", true).unwrap();

        // "hi": zig-zag length 2 → 0x04, then the bytes; true → 0x01.
        let bytes = writer.write(&record).unwrap();
        assert_eq!(bytes, vec![0x04, b'h', b'i', 0x01]);
        assert_eq!(writer.write(&record).unwrap(), bytes);
    }

    #[test]
    fn invalid_record_is_not_written() {
        let writer = GenericDatumWriter::new(account_schema()).unwrap();
        let record = GenericRecord::new(account_schema());
        let err = writer.write(&record).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    }

    #[test]
    fn writer_schema_decides_nullability() {
        let writer_schema = Arc::new(Schema::builder("c").optional_string("name").build().unwrap());
        let record_schema = Arc::new(Schema::builder("c").required_string("name").build().unwrap());
        let mut record = GenericRecord::new(record_schema);
        record.put("name", "x").unwrap();
        assert!(record::validate(&writer_schema, &record).is_ok());

        let writer = GenericDatumWriter::new(Arc::clone(&writer_schema)).unwrap();
        let bytes = writer.write(&record).unwrap();
        // Union branch 1 (zig-zag 0x02), then "x".
        assert_eq!(bytes, vec![0x02, 0x02, b'x']);

        let back = GenericDatumReader::new(writer_schema).unwrap().read(&bytes).unwrap();
        assert_eq!(back.require_str("name").unwrap(), "x");
    }

    #[test]
    fn truncated_and_trailing_input_is_malformed() {
        let writer = GenericDatumWriter::new(account_schema()).unwrap();
        let reader = GenericDatumReader::new(account_schema()).unwrap();
        let bytes = writer.write(&account(Some("vip"))).unwrap();

        let err = reader.read(&bytes[..bytes.len() - 1]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);

        let mut padded = bytes.clone();
        padded.push(0);
        let err = reader.read(&padded).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPayload);
    }

    #[test]
    fn repeated_record_type_is_referenced_by_name() {
        let point = Schema::builder("Point").required_int("x").build().unwrap();
        let line = Arc::new(
            Schema::builder("Line")
                .namespace("geo")
                .required_record("from", point.clone())
                .required_record("to", point)
                .build()
                .unwrap(),
        );
        assert!(avro_schema(&line).is_ok());
        assert!(GenericDatumReader::new(line).is_ok());
    }
}
