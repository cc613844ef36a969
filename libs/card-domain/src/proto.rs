use recserde_api::message::{
    DescribedMessage, FieldDescriptor, FieldKind, FieldValue, MessageDescriptor,
};
use recserde_api::SerdeError;

use crate::card::Card;

/// `card.CreditCard` protobuf message.
///
/// ```proto
/// message CreditCard {
///   string name = 1;
///   string card_number = 2;
///   string type = 3;
///   string country = 4;
///   string currency = 5;
///   bool blocked = 6;
/// }
/// ```
#[derive(Clone, PartialEq, prost::Message)]
pub struct CreditCard {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub card_number: String,
    /// Card network tag (`"VISA"`, ...). Free text on the wire.
    #[prost(string, tag = "3")]
    pub r#type: String,
    #[prost(string, tag = "4")]
    pub country: String,
    #[prost(string, tag = "5")]
    pub currency: String,
    #[prost(bool, tag = "6")]
    pub blocked: bool,
}

static CREDIT_CARD: MessageDescriptor = MessageDescriptor {
    full_name: "card.CreditCard",
    fields: &[
        FieldDescriptor { name: "name", number: 1, kind: FieldKind::String },
        FieldDescriptor { name: "card_number", number: 2, kind: FieldKind::String },
        FieldDescriptor { name: "type", number: 3, kind: FieldKind::String },
        FieldDescriptor { name: "country", number: 4, kind: FieldKind::String },
        FieldDescriptor { name: "currency", number: 5, kind: FieldKind::String },
        FieldDescriptor { name: "blocked", number: 6, kind: FieldKind::Bool },
    ],
};

impl DescribedMessage for CreditCard {
    fn descriptor() -> &'static MessageDescriptor {
        &CREDIT_CARD
    }

    fn field_values(&self) -> Vec<FieldValue<'_>> {
        vec![
            FieldValue::String(&self.name),
            FieldValue::String(&self.card_number),
            FieldValue::String(&self.r#type),
            FieldValue::String(&self.country),
            FieldValue::String(&self.currency),
            FieldValue::Bool(self.blocked),
        ]
    }
}

impl From<&Card> for CreditCard {
    fn from(card: &Card) -> Self {
        Self {
            name: card.name().to_string(),
            card_number: card.card_number().to_string(),
            r#type: card.card_type().as_str().to_string(),
            country: card.country().to_string(),
            currency: card.currency().to_string(),
            blocked: card.blocked(),
        }
    }
}

impl TryFrom<&CreditCard> for Card {
    type Error = SerdeError;

    /// Fails with `UnknownEnumTag` if `type` is not a known card network.
    fn try_from(msg: &CreditCard) -> Result<Self, Self::Error> {
        Ok(Card::new(
            msg.name.as_str(),
            msg.country.as_str(),
            msg.currency.as_str(),
            msg.card_number.as_str(),
            msg.blocked,
            msg.r#type.parse()?,
        ))
    }
}
