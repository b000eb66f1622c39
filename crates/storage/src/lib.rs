//! Kestrel Storage
//!
//! Thread-safe, per-symbol partitioned price storage.
//!
//! - Each symbol owns one [`Partition`] holding its own series and its own lock
//! - Partitions are created on first access, exactly once, by a shared factory
//! - Work on one symbol never waits on another symbol's lock
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kestrel_storage::Storage;
//! use kestrel_timeseries::RetentionPolicy;
//!
//! let storage = Storage::with_retention(RetentionPolicy::count(500), clock)?;
//! storage.with_partition("BTCUSD", |series| series.append(dec!(42000), None));
//! let snapshot = storage.with_partition("BTCUSD", |series| series.snapshot());
//! ```

mod partition;
mod storage;

pub use partition::Partition;
pub use storage::{SeriesFactory, Storage};
