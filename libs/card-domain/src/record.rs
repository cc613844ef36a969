use std::sync::Arc;

use recserde_api::{GenericRecord, Schema, SerdeError};

use crate::card::Card;

pub const NAME: &str = "name";
pub const CARD_NUMBER: &str = "cardNumber";
pub const CARD_TYPE: &str = "cardType";
pub const COUNTRY: &str = "country";
pub const CURRENCY: &str = "currency";
pub const BLOCKED: &str = "blocked";

/// `credit_card` record schema shared by the card serdes.
pub fn card_schema() -> Result<Schema, SerdeError> {
    Schema::builder("credit_card")
        .required_string(NAME)
        .required_string(CARD_NUMBER)
        .required_string(CARD_TYPE)
        .required_string(COUNTRY)
        .required_string(CURRENCY)
        .required_bool(BLOCKED)
        .build()
}

impl Card {
    /// Project the card into a record of `schema` (the card schema).
    pub fn to_record(&self, schema: &Arc<Schema>) -> Result<GenericRecord, SerdeError> {
        let mut record = GenericRecord::new(Arc::clone(schema));
        record.put(NAME, self.name())?;
        record.put(CARD_NUMBER, self.card_number())?;
        record.put(CARD_TYPE, self.card_type().as_str())?;
        record.put(COUNTRY, self.country())?;
        record.put(CURRENCY, self.currency())?;
        record.put(BLOCKED, self.blocked())?;
        Ok(record)
    }

    /// Read a card from a record by field name.
    ///
    /// Missing or mistyped fields are a `SchemaViolation`; a `cardType`
    /// outside the known networks is an `UnknownEnumTag`.
    pub fn from_record(record: &GenericRecord) -> Result<Card, SerdeError> {
        Ok(Card::new(
            record.require_str(NAME)?,
            record.require_str(COUNTRY)?,
            record.require_str(CURRENCY)?,
            record.require_str(CARD_NUMBER)?,
            record.require_bool(BLOCKED)?,
            record.require_str(CARD_TYPE)?.parse()?,
        ))
    }
}
