use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Order Value Objects
// ============================================================================

/// User-entered order data that has not been submitted yet.
///
/// On the wire the item is called `coffee_type`, matching the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_name: String,
    #[serde(rename = "coffee_type")]
    pub item_type: String,
}

impl OrderDraft {
    pub fn new(customer_name: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            item_type: item_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.customer_name.is_empty() && self.item_type.is_empty()
    }
}

/// The items the order form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoffeeType {
    Espresso,
    Cappuccino,
    Latte,
    Americano,
    Macchiato,
    Mocha,
}

impl CoffeeType {
    pub const ALL: [CoffeeType; 6] = [
        CoffeeType::Espresso,
        CoffeeType::Cappuccino,
        CoffeeType::Latte,
        CoffeeType::Americano,
        CoffeeType::Macchiato,
        CoffeeType::Mocha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoffeeType::Espresso => "espresso",
            CoffeeType::Cappuccino => "cappuccino",
            CoffeeType::Latte => "latte",
            CoffeeType::Americano => "americano",
            CoffeeType::Macchiato => "macchiato",
            CoffeeType::Mocha => "mocha",
        }
    }
}

impl fmt::Display for CoffeeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown coffee type: {0}")]
pub struct UnknownCoffeeType(pub String);

impl FromStr for CoffeeType {
    type Err = UnknownCoffeeType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoffeeType::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCoffeeType(s.to_string()))
    }
}

/// Whether a submission is currently awaiting the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
}

/// Body returned by the order endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub msg: String,
}

// ============================================================================
// Unit Tests
// ============================================================================
