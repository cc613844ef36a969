//! Direct protobuf serde: `card.CreditCard` bytes → `credit_card` record.
//!
//! Fields are copied as-is; the card network stays the free-text tag found
//! on the wire. Read-only: records are never written back as protobuf.

pub mod codec;

use std::sync::Arc;

use card_domain::record::{BLOCKED, CARD_NUMBER, CARD_TYPE, COUNTRY, CURRENCY, NAME};
use card_domain::{card_schema, CreditCard};
use recserde_api::plugin::{DecodeSerde, RecordDeserializer};
use recserde_api::{GenericRecord, Schema, SerdeError};

pub use codec::ProtobufCodec;

/// Catalog name of this serde.
pub const PLUGIN_NAME: &str = "card-protobuf";

// ═══════════════════════════════════════════════════════════════
//  CardProtobufSerde
// ═══════════════════════════════════════════════════════════════

pub struct CardProtobufSerde {
    schema: Arc<Schema>,
}

impl CardProtobufSerde {
    pub fn new() -> Result<Self, SerdeError> {
        Ok(Self {
            schema: Arc::new(card_schema()?),
        })
    }
}

impl DecodeSerde for CardProtobufSerde {
    fn deserializer(&self) -> Result<Box<dyn RecordDeserializer>, SerdeError> {
        Ok(Box::new(CardProtobufDeserializer {
            codec: ProtobufCodec::new(),
            schema: Arc::clone(&self.schema),
        }))
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }
}

struct CardProtobufDeserializer {
    codec: ProtobufCodec<CreditCard>,
    schema: Arc<Schema>,
}

impl RecordDeserializer for CardProtobufDeserializer {
    fn deserialize(&self, bytes: &[u8]) -> Result<GenericRecord, SerdeError> {
        let card = self.codec.decode(bytes)?;

        let mut record = GenericRecord::new(Arc::clone(&self.schema));
        record.put(NAME, card.name)?;
        record.put(CARD_NUMBER, card.card_number)?;
        record.put(CARD_TYPE, card.r#type)?;
        record.put(COUNTRY, card.country)?;
        record.put(CURRENCY, card.currency)?;
        record.put(BLOCKED, card.blocked)?;
        tracing::trace!(bytes = bytes.len(), "decoded protobuf card");
        Ok(record)
    }
}
