use std::sync::Arc;

use recserde_api::binary::{GenericDatumReader, GenericDatumWriter};
use recserde_api::message::DescribedMessage;
use recserde_api::registry::SchemaRegistry;
use recserde_api::{GenericRecord, Schema, SerdeError};
use serde_card_protobuf::ProtobufCodec;

// ═══════════════════════════════════════════════════════════════
//  BridgeCodec
// ═══════════════════════════════════════════════════════════════

/// Protobuf → generic record, through the generic binary encoding.
///
/// The message is decoded, written with a datum writer for the schema
/// derived from `M`, and read back with a reader for the same schema. The
/// resulting record has exactly the shape the writer would produce for a
/// hand-built record with the same field values.
pub struct BridgeCodec<M> {
    protobuf: ProtobufCodec<M>,
    writer: GenericDatumWriter,
    reader: GenericDatumReader,
}

impl<M> BridgeCodec<M>
where
    M: DescribedMessage + prost::Message + Default,
{
    /// Looks up (deriving on first use) the schema for `M` in `registry`.
    pub fn new(registry: &SchemaRegistry) -> Result<Self, SerdeError> {
        let schema = registry.schema_for::<M>()?;
        Ok(Self {
            protobuf: ProtobufCodec::new(),
            writer: GenericDatumWriter::new(Arc::clone(&schema))?,
            reader: GenericDatumReader::new(schema)?,
        })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        self.writer.schema()
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<GenericRecord, SerdeError> {
        let message = self.protobuf.decode(bytes)?;
        let datum = self.writer.write_message(&message)?;
        let record = self.reader.read(&datum)?;
        tracing::trace!(
            bytes = bytes.len(),
            datum = datum.len(),
            schema = %self.schema().full_name(),
            "bridged protobuf message"
        );
        Ok(record)
    }
}
