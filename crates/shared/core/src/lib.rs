//! Kestrel Core Domain
//!
//! Pure value types shared by every Kestrel crate.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod error;
pub mod tick;
pub mod values;

// Re-export commonly used types at crate root
pub use error::ValidationError;
pub use tick::TickRecord;
pub use values::{Price, Snapshot, Symbol, Timestamp};
