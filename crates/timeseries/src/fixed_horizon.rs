//! Duration-bounded series

use crate::error::{SeriesError, SeriesResult};
use crate::series::{Series, TimeSeries};
use chrono::Duration;
use kestrel_core::{Price, Snapshot, Timestamp};
use kestrel_ports::Clock;
use std::sync::Arc;

/// Series covering at most `horizon` of history
///
/// After every append, each retained entry satisfies
/// `appended_timestamp - entry_timestamp <= horizon`.
pub struct FixedHorizonTimeSeries {
    inner: TimeSeries,
    horizon: Duration,
}

impl FixedHorizonTimeSeries {
    /// Create an empty series covering `horizon`
    pub fn new(clock: Arc<dyn Clock>, horizon: Duration) -> SeriesResult<Self> {
        if horizon < Duration::zero() {
            return Err(SeriesError::InvalidArgument(format!(
                "horizon must not be negative, got {horizon}"
            )));
        }

        Ok(Self {
            inner: TimeSeries::new(clock),
            horizon,
        })
    }

    /// Create a series pre-filled with `entries`, applying the horizon as
    /// each entry is loaded
    pub fn from_entries(
        clock: Arc<dyn Clock>,
        horizon: Duration,
        entries: impl IntoIterator<Item = (Timestamp, Price)>,
    ) -> SeriesResult<Self> {
        let mut series = Self::new(clock, horizon)?;
        for (timestamp, price) in entries {
            series.append(price, Some(timestamp));
        }
        Ok(series)
    }

    /// Get the configured horizon
    pub fn horizon(&self) -> Duration {
        self.horizon
    }

    fn evict_older_than(&mut self, latest: Timestamp) {
        let horizon = self.horizon;

        if self.inner.is_chronological() {
            // Entries are sorted, so violators form a prefix
            let expired = self
                .inner
                .iter()
                .take_while(|(ts, _)| latest - **ts > horizon)
                .count();
            self.inner.evict_front(expired);
        } else {
            self.inner.retain(|ts| latest - *ts <= horizon);
        }
    }
}

impl Series for FixedHorizonTimeSeries {
    fn append(&mut self, price: Price, timestamp: Option<Timestamp>) -> Timestamp {
        let timestamp = self.inner.append(price, timestamp);
        self.evict_older_than(timestamp);
        timestamp
    }

    fn snapshot(&self) -> Snapshot {
        self.inner.snapshot()
    }

    fn get(&self, timestamp: &Timestamp) -> Option<Price> {
        self.inner.get(timestamp)
    }

    fn latest(&self) -> Option<(Timestamp, Price)> {
        self.inner.latest()
    }

    fn timestamps(&self) -> Vec<Timestamp> {
        self.inner.timestamps()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn fresh(&self) -> Box<dyn Series> {
        Box::new(Self {
            inner: self.inner.empty_like(),
            horizon: self.horizon,
        })
    }
}
