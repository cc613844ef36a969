use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use arc_swap::ArcSwap;

use crate::error::SerdeError;
use crate::message::{DescribedMessage, FieldKind, MessageDescriptor};
use crate::schema::{Field, FieldType, ScalarType, Schema};

/// Derive a record schema from a message descriptor.
///
/// Field names and order are taken as declared; every field is required.
/// Nested messages become nested records. A message that (transitively)
/// contains itself cannot be expressed as a finite schema and is rejected.
pub fn derive_schema(descriptor: &MessageDescriptor) -> Result<Schema, SerdeError> {
    let mut path = Vec::new();
    derive_inner(descriptor, &mut path)
}

fn derive_inner(
    descriptor: &MessageDescriptor,
    path: &mut Vec<&'static str>,
) -> Result<Schema, SerdeError> {
    if path.contains(&descriptor.full_name) {
        return Err(SerdeError::schema(format!(
            "message '{}' is recursive ({} -> {})",
            descriptor.full_name,
            path.join(" -> "),
            descriptor.full_name
        )));
    }
    path.push(descriptor.full_name);

    let mut fields = Vec::with_capacity(descriptor.fields.len());
    for field in descriptor.fields {
        let field_type = match field.kind {
            FieldKind::Bool => FieldType::Scalar(ScalarType::Bool),
            FieldKind::Int32 => FieldType::Scalar(ScalarType::Int32),
            FieldKind::String => FieldType::Scalar(ScalarType::String),
            FieldKind::Message(nested) => {
                FieldType::Record(Box::new(derive_inner(nested(), path)?))
            }
        };
        fields.push(Field::new(field.name, field_type, false));
    }

    path.pop();
    Schema::new(
        descriptor.name(),
        descriptor.package().map(str::to_string),
        fields,
    )
    .map_err(|e| e.with_context(format!("message '{}'", descriptor.full_name)))
}

type SchemaMap = HashMap<TypeId, Arc<Schema>>;

/// Memoized schemas, one per message type.
///
/// Lookups are lock-free loads of an immutable map. A new schema is
/// published by swapping in a copy of the map that contains it; when two
/// callers derive the same type at once, the first published schema wins
/// and the other is dropped.
pub struct SchemaRegistry {
    schemas: ArcSwap<SchemaMap>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self {
            schemas: ArcSwap::from_pointee(HashMap::new()),
        }
    }

    /// Process-wide registry.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    /// Schema for message type `M`, derived on first use.
    pub fn schema_for<M: DescribedMessage>(&self) -> Result<Arc<Schema>, SerdeError> {
        let key = TypeId::of::<M>();
        if let Some(schema) = self.schemas.load().get(&key) {
            return Ok(Arc::clone(schema));
        }

        let descriptor = M::descriptor();
        let derived = Arc::new(derive_schema(descriptor)?);

        self.schemas.rcu(|current| {
            let mut next = SchemaMap::clone(current);
            next.entry(key).or_insert_with(|| Arc::clone(&derived));
            next
        });

        let published = self
            .schemas
            .load()
            .get(&key)
            .map(Arc::clone)
            .unwrap_or(derived);
        tracing::debug!(
            message = descriptor.full_name,
            fields = published.fields().len(),
            "derived record schema"
        );
        Ok(published)
    }

    /// Number of memoized schemas.
    pub fn len(&self) -> usize {
        self.schemas.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.load().is_empty()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.len())
            .finish()
    }
}
