//! Tick records - one price observation for one symbol
//!
//! The wire shape is:
//!
//! ```json
//! { "symbol": "BTC-USD", "price": 50000.5, "timestamp": "2024-01-01T00:00:00Z" }
//! ```
//!
//! `price` may be a JSON number or a decimal string. `timestamp` is an
//! optional RFC3339 string; when it is absent the storage clock decides
//! the time at append.

use crate::error::ValidationError;
use crate::values::{Price, Symbol, Timestamp};
use serde::{Deserialize, Serialize};

/// A single tick as accepted by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub symbol: Symbol,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl TickRecord {
    /// Create a tick stamped with an explicit time
    pub fn new(symbol: impl Into<Symbol>, price: Price, timestamp: Timestamp) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp: Some(timestamp),
        }
    }

    /// Create a tick that will be stamped at append time
    pub fn unstamped(symbol: impl Into<Symbol>, price: Price) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            timestamp: None,
        }
    }

    /// Parse and validate a JSON tick payload
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let record: TickRecord =
            serde_json::from_str(json).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    /// Check the invariants the store relies on
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.symbol.trim().is_empty() {
            return Err(ValidationError::EmptySymbol);
        }
        if self.price < Price::ZERO {
            return Err(ValidationError::NegativePrice(self.price.to_string()));
        }
        Ok(())
    }
}
