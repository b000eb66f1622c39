//! Error types for inbound record validation

use thiserror::Error;

/// Raised when an inbound tick payload does not describe a usable tick
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Malformed tick payload: {0}")]
    Malformed(String),

    #[error("Tick symbol must not be empty")]
    EmptySymbol,

    #[error("Tick price must not be negative, got {0}")]
    NegativePrice(String),
}
