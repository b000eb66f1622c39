//! Kestrel Ports
//!
//! Port definitions (traits) for the Kestrel tick store.
//! These define the boundaries between the store and pluggable logic.

mod clock;
mod signal;

pub use clock::Clock;
pub use signal::{OrderCallback, SignalGenerator};
