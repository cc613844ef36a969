//! Bridging serde: `card.CreditCard` protobuf bytes normalized into the
//! record schema derived from the message. Read-only.

pub mod bridge;

use std::sync::Arc;

use card_domain::CreditCard;
use recserde_api::plugin::{DecodeSerde, RecordDeserializer};
use recserde_api::registry::SchemaRegistry;
use recserde_api::{GenericRecord, Schema, SerdeError};

pub use bridge::BridgeCodec;

/// Catalog name of this serde.
pub const PLUGIN_NAME: &str = "card-bridge";

pub struct CardBridgeSerde {
    codec: Arc<BridgeCodec<CreditCard>>,
}

impl CardBridgeSerde {
    /// Uses the process-wide schema registry.
    pub fn new() -> Result<Self, SerdeError> {
        Self::with_registry(SchemaRegistry::global())
    }

    pub fn with_registry(registry: &SchemaRegistry) -> Result<Self, SerdeError> {
        Ok(Self {
            codec: Arc::new(BridgeCodec::new(registry)?),
        })
    }
}

impl DecodeSerde for CardBridgeSerde {
    fn deserializer(&self) -> Result<Box<dyn RecordDeserializer>, SerdeError> {
        Ok(Box::new(CardBridgeDeserializer(Arc::clone(&self.codec))))
    }

    fn schema(&self) -> Arc<Schema> {
        Arc::clone(self.codec.schema())
    }
}

struct CardBridgeDeserializer(Arc<BridgeCodec<CreditCard>>);

impl RecordDeserializer for CardBridgeDeserializer {
    fn deserialize(&self, bytes: &[u8]) -> Result<GenericRecord, SerdeError> {
        self.0.decode(bytes)
    }
}
