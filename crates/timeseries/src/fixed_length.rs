//! Count-bounded series

use crate::error::{SeriesError, SeriesResult};
use crate::series::{Series, TimeSeries};
use kestrel_core::{Price, Snapshot, Timestamp};
use kestrel_ports::Clock;
use std::sync::Arc;

/// Series holding at most `max_length` entries
///
/// When an append pushes the length past the bound, the single oldest
/// entry is evicted.
///
/// Eviction costs O(`max_length`) per append once the series is full.
pub struct FixedLengthTimeSeries {
    inner: TimeSeries,
    max_length: usize,
}

impl FixedLengthTimeSeries {
    /// Create an empty series bounded to `max_length` entries
    pub fn new(clock: Arc<dyn Clock>, max_length: usize) -> SeriesResult<Self> {
        if max_length == 0 {
            return Err(SeriesError::InvalidArgument(
                "max_length must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            inner: TimeSeries::new(clock),
            max_length,
        })
    }

    /// Create a series pre-filled with `entries`, keeping only the newest
    /// `max_length` of them
    pub fn from_entries(
        clock: Arc<dyn Clock>,
        max_length: usize,
        entries: impl IntoIterator<Item = (Timestamp, Price)>,
    ) -> SeriesResult<Self> {
        let mut series = Self::new(clock, max_length)?;
        for (timestamp, price) in entries {
            series.append(price, Some(timestamp));
        }
        Ok(series)
    }

    /// Get the configured bound
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Check if the series is at capacity
    pub fn is_full(&self) -> bool {
        self.inner.len() >= self.max_length
    }
}

impl Series for FixedLengthTimeSeries {
    fn append(&mut self, price: Price, timestamp: Option<Timestamp>) -> Timestamp {
        let timestamp = self.inner.append(price, timestamp);

        if self.inner.len() > self.max_length {
            self.inner.evict_front(1);
        }

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
            max_length: self.max_length,
        })
    }
}
