//! Kestrel Timeseries
//!
//! Insertion-ordered price series keyed by timestamp, with two retention
//! variants layered on the unbounded base:
//!
//! - [`FixedLengthTimeSeries`] - keeps the newest N entries
//! - [`FixedHorizonTimeSeries`] - keeps entries within a duration of the latest append
//!
//! All three implement [`Series`], which is what storage partitions hold.
//! [`RetentionPolicy`] is the serializable choice between the two bounds.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kestrel_timeseries::{RetentionPolicy, Series};
//! use kestrel_clock::SystemClock;
//! use std::sync::Arc;
//!
//! let mut series = RetentionPolicy::count(2).build(Arc::new(SystemClock::new()))?;
//! series.append(dec!(1.0), None);
//! let snapshot = series.snapshot();
//! ```

pub mod error;
pub mod fixed_horizon;
pub mod fixed_length;
pub mod retention;
pub mod series;

pub use error::{SeriesError, SeriesResult};
pub use fixed_horizon::FixedHorizonTimeSeries;
pub use fixed_length::FixedLengthTimeSeries;
pub use retention::{HorizonSpec, RetentionPolicy};
pub use series::{Series, TimeSeries};
