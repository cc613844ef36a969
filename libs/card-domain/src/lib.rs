//! Credit card domain shared by the card serdes: the `Card` value object,
//! the `card.CreditCard` protobuf message and the `credit_card` record schema.

pub mod card;
pub mod proto;
pub mod record;

pub use card::{Card, CardType};
pub use proto::CreditCard;
pub use record::card_schema;

#[cfg(test)]
pub(crate) mod strategy {
    use proptest::prelude::*;

    use crate::card::{Card, CardType};

    pub fn card() -> impl Strategy<Value = Card> {
        (
            ".{0,24}",
            "[A-Z]{2}",
            "[A-Z]{3}",
            "[0-9]{4,19}",
            any::<bool>(),
            prop::sample::select(CardType::ALL.to_vec()),
        )
            .prop_map(|(name, country, currency, number, blocked, card_type)| {
                Card::new(name, country, currency, number, blocked, card_type)
            })
    }
}
