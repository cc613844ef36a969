use std::sync::Arc;

use crate::error::SerdeError;
use crate::record::GenericRecord;
use crate::schema::Schema;

/// Runtime deserializer: `bytes → GenericRecord`.
pub trait RecordDeserializer: Send + Sync {
    fn deserialize(&self, bytes: &[u8]) -> Result<GenericRecord, SerdeError>;
}

/// Runtime serializer: `GenericRecord → bytes`.
pub trait RecordSerializer: Send + Sync {
    fn serialize(&self, record: &GenericRecord) -> Result<Vec<u8>, SerdeError>;
}

/// Serde plugin that can read its wire format.
///
/// - `deserializer()`: builds a deserializer.
/// - `schema()`: schema of every record the deserializer produces.
pub trait DecodeSerde: Send + Sync {
    fn deserializer(&self) -> Result<Box<dyn RecordDeserializer>, SerdeError>;

    fn schema(&self) -> Arc<Schema>;
}

/// Serde plugin that can also write its wire format.
pub trait EncodeSerde: DecodeSerde {
    fn serializer(&self) -> Result<Box<dyn RecordSerializer>, SerdeError>;
}

/// A registered serde plugin, tagged with its capabilities.
///
/// Read-only plugins never get asked for a serializer at compile time; the
/// name-based host surface reports `NotImplemented` instead.
#[derive(Clone)]
pub enum SerdePlugin {
    ReadOnly(Arc<dyn DecodeSerde>),
    ReadWrite(Arc<dyn EncodeSerde>),
}

impl SerdePlugin {
    pub fn read_only(plugin: impl DecodeSerde + 'static) -> Self {
        SerdePlugin::ReadOnly(Arc::new(plugin))
    }

    pub fn read_write(plugin: impl EncodeSerde + 'static) -> Self {
        SerdePlugin::ReadWrite(Arc::new(plugin))
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, SerdePlugin::ReadWrite(_))
    }

    pub fn deserializer(&self) -> Result<Box<dyn RecordDeserializer>, SerdeError> {
        match self {
            SerdePlugin::ReadOnly(p) => p.deserializer(),
            SerdePlugin::ReadWrite(p) => p.deserializer(),
        }
    }

    pub fn serializer(&self) -> Result<Box<dyn RecordSerializer>, SerdeError> {
        match self {
            SerdePlugin::ReadOnly(_) => Err(SerdeError::not_implemented(
                "serde is read-only: serialization is not supported",
            )),
            SerdePlugin::ReadWrite(p) => p.serializer(),
        }
    }

    pub fn schema(&self) -> Arc<Schema> {
        match self {
            SerdePlugin::ReadOnly(p) => p.schema(),
            SerdePlugin::ReadWrite(p) => p.schema(),
        }
    }
}

impl std::fmt::Debug for SerdePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = if self.is_writable() { "ReadWrite" } else { "ReadOnly" };
        f.debug_tuple(mode).field(&self.schema().full_name()).finish()
    }
}
