//! Object-graph serde for `Card`.
//!
//! Records are converted to `Card` values by field name, so writing checks
//! the card network against the closed `CardType` set. Blobs carry the
//! card type identity and version; see [`blob`] for the layout.

pub mod blob;

use std::sync::Arc;

use card_domain::{card_schema, Card};
use recserde_api::plugin::{DecodeSerde, EncodeSerde, RecordDeserializer, RecordSerializer};
use recserde_api::{GenericRecord, Schema, SerdeError};

use blob::{BlobReader, BlobType, BlobWriter};

/// Catalog name of this serde.
pub const PLUGIN_NAME: &str = "card-object";

impl BlobType for Card {
    const TYPE_ID: &'static str = "card.Card";
    const VERSION: u8 = 1;

    fn write_fields(&self, w: &mut BlobWriter) -> Result<(), SerdeError> {
        w.put_str(self.name())?;
        w.put_str(self.country())?;
        w.put_str(self.currency())?;
        w.put_str(self.card_number())?;
        w.put_bool(self.blocked());
        w.put_tag(self.card_type().as_str())
    }

    fn read_fields(r: &mut BlobReader<'_>) -> Result<Self, SerdeError> {
        let name = r.read_str("name")?;
        let country = r.read_str("country")?;
        let currency = r.read_str("currency")?;
        let card_number = r.read_str("card number")?;
        let blocked = r.read_bool("blocked")?;
        let card_type = r.read_tag("card type")?.parse()?;
        Ok(Card::new(name, country, currency, card_number, blocked, card_type))
    }
}

// ═══════════════════════════════════════════════════════════════
//  CardObjectSerde
// ═══════════════════════════════════════════════════════════════

pub struct CardObjectSerde {
    schema: Arc<Schema>,
}

impl CardObjectSerde {
    pub fn new() -> Result<Self, SerdeError> {
        Ok(Self {
            schema: Arc::new(card_schema()?),
        })
    }
}

impl DecodeSerde for CardObjectSerde {
    fn deserializer(&self) -> Result<Box<dyn RecordDeserializer>, SerdeError> {
        Ok(Box::new(CardObjectCodec {
            schema: Arc::clone(&self.schema),
        }))
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }
}

impl EncodeSerde for CardObjectSerde {
    fn serializer(&self) -> Result<Box<dyn RecordSerializer>, SerdeError> {
        Ok(Box::new(CardObjectCodec {
            schema: Arc::clone(&self.schema),
        }))
    }
}

struct CardObjectCodec {
    schema: Arc<Schema>,
}

impl RecordSerializer for CardObjectCodec {
    fn serialize(&self, record: &GenericRecord) -> Result<Vec<u8>, SerdeError> {
        record.validate()?;
        let card = Card::from_record(record)?;
        let bytes = blob::encode(&card)?;
        tracing::trace!(bytes = bytes.len(), "encoded card blob");
        Ok(bytes)
    }
}

impl RecordDeserializer for CardObjectCodec {
    fn deserialize(&self, bytes: &[u8]) -> Result<GenericRecord, SerdeError> {
        let card: Card = blob::decode(bytes)?;
        card.to_record(&self.schema)
    }
}
