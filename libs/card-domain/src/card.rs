use std::fmt;
use std::str::FromStr;

use recserde_api::SerdeError;

/// Card network. Closed set: anything else is an unknown tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardType {
    Visa,
    Mastercard,
    Amex,
}

impl CardType {
    pub const ALL: [CardType; 3] = [CardType::Visa, CardType::Mastercard, CardType::Amex];

    /// Tag as it appears on the wire and in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Visa => "VISA",
            CardType::Mastercard => "MASTERCARD",
            CardType::Amex => "AMEX",
        }
    }
}

impl FromStr for CardType {
    type Err = SerdeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CardType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SerdeError::unknown_enum_tag(format!("unknown card type '{s}'")))
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Credit card value object. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    name: String,
    country: String,
    currency: String,
    card_number: String,
    blocked: bool,
    card_type: CardType,
}

impl Card {
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        currency: impl Into<String>,
        card_number: impl Into<String>,
        blocked: bool,
        card_type: CardType,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            currency: currency.into(),
            card_number: card_number.into(),
            blocked,
            card_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn blocked(&self) -> bool {
        self.blocked
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }
}
