//! Kestrel Clock Infrastructure
//!
//! Time sources for the store:
//!
//! - [`SystemClock`] - wall-clock time for production ingestion
//! - [`ManualClock`] - frozen or stepped time for replays and tests
//!
//! ## Usage
//!
//! ```ignore
//! use kestrel_clock::{Clock, ManualClock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::new(None);
//! let t0 = clock.now();
//! clock.advance(Duration::minutes(5));
//! assert_eq!(clock.now() - t0, Duration::minutes(5));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use kestrel_ports::Clock;
