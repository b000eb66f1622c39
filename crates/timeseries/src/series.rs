//! Unbounded price series and the `Series` interface shared by every
//! retention variant.

use indexmap::IndexMap;
use kestrel_core::{Price, Snapshot, Timestamp};
use kestrel_ports::Clock;
use std::sync::Arc;

/// Common interface of every series a storage partition can hold
pub trait Series: Send + Sync {
    /// Record `price` at `timestamp`, or at the clock's current time when
    /// `timestamp` is `None`, then apply the retention rule.
    ///
    /// Returns the timestamp that was actually recorded.
    fn append(&mut self, price: Price, timestamp: Option<Timestamp>) -> Timestamp;

    /// Copy the current entries out, in insertion order
    fn snapshot(&self) -> Snapshot;

    /// Price recorded at exactly `timestamp`
    fn get(&self, timestamp: &Timestamp) -> Option<Price>;

    /// Most recently inserted entry
    fn latest(&self) -> Option<(Timestamp, Price)>;

    /// All recorded timestamps, in insertion order
    fn timestamps(&self) -> Vec<Timestamp>;

    /// Number of entries
    fn len(&self) -> usize;

    /// A new, empty series with the same bound and clock
    fn fresh(&self) -> Box<dyn Series>;

    /// Check if empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Timestamp-price pairs without any retention bound
///
/// Timestamps are unique keys. Appending at an existing timestamp replaces
/// the price in place, so the entry keeps its position and the length does
/// not change.
pub struct TimeSeries {
    /// Entries in insertion order
    data: IndexMap<Timestamp, Price>,
    /// Source of "now" for unstamped appends
    clock: Arc<dyn Clock>,
    /// True while every new key was >= the key inserted before it
    chronological: bool,
}

impl TimeSeries {
    /// Create an empty series
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            data: IndexMap::new(),
            clock,
            chronological: true,
        }
    }

    /// Create a series pre-filled with `entries`
    pub fn from_entries(
        clock: Arc<dyn Clock>,
        entries: impl IntoIterator<Item = (Timestamp, Price)>,
    ) -> Self {
        let mut series = Self::new(clock);
        for (timestamp, price) in entries {
            series.insert(timestamp, price);
        }
        series
    }

    /// An empty series sharing this one's clock
    pub(crate) fn empty_like(&self) -> Self {
        Self::new(Arc::clone(&self.clock))
    }

    /// Whether insertion order is also timestamp order
    pub fn is_chronological(&self) -> bool {
        self.chronological
    }

    /// Oldest entry
    pub fn first(&self) -> Option<(Timestamp, Price)> {
        self.data.first().map(|(ts, price)| (*ts, *price))
    }

    pub(crate) fn resolve(&self, timestamp: Option<Timestamp>) -> Timestamp {
        timestamp.unwrap_or_else(|| self.clock.now())
    }

    pub(crate) fn insert(&mut self, timestamp: Timestamp, price: Price) {
        let previous_last = self.data.last().map(|(ts, _)| *ts);
        let (_, replaced) = self.data.insert_full(timestamp, price);

        if replaced.is_none() {
            if let Some(last) = previous_last {
                if timestamp < last {
                    self.chronological = false;
                }
            }
        }
    }

    /// Drop the `count` oldest entries
    ///
    /// Shifts every remaining entry down, so each call is O(len) and runs
    /// under whatever partition lock the caller holds.
    pub(crate) fn evict_front(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        let count = count.min(self.data.len());
        self.data.drain(..count);
        self.refresh_order();
    }

    /// Keep only entries matching `keep`
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&Timestamp) -> bool) {
        self.data.retain(|ts, _| keep(ts));
        self.refresh_order();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Timestamp, &Price)> {
        self.data.iter()
    }

    fn refresh_order(&mut self) {
        if self.chronological {
            return;
        }
        self.chronological = self
            .data
            .keys()
            .zip(self.data.keys().skip(1))
            .all(|(a, b)| a <= b);
    }
}

impl Series for TimeSeries {
    fn append(&mut self, price: Price, timestamp: Option<Timestamp>) -> Timestamp {
        let timestamp = self.resolve(timestamp);
        self.insert(timestamp, price);
        timestamp
    }

    fn snapshot(&self) -> Snapshot {
        self.data.iter().map(|(ts, price)| (*ts, *price)).collect()
    }

    fn get(&self, timestamp: &Timestamp) -> Option<Price> {
        self.data.get(timestamp).copied()
    }

    fn latest(&self) -> Option<(Timestamp, Price)> {
        self.data.last().map(|(ts, price)| (*ts, *price))
    }

    fn timestamps(&self) -> Vec<Timestamp> {
        self.data.keys().copied().collect()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn fresh(&self) -> Box<dyn Series> {
        Box::new(self.empty_like())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use kestrel_clock::ManualClock;
    use rust_decimal_macros::dec;

    fn t(secs: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    #[test]
    fn test_append_returns_given_timestamp() {
        let mut series = TimeSeries::new(ManualClock::new(Some(t(0))));

        assert_eq!(series.append(dec!(1), Some(t(5))), t(5));
        assert_eq!(series.get(&t(5)), Some(dec!(1)));
        assert_eq!(series.len(), 1);
    }

    #[test]
    fn test_unstamped_append_uses_clock() {
        let clock = ManualClock::new(Some(t(100)));
        let mut series = TimeSeries::new(clock.clone());

        assert_eq!(series.append(dec!(1), None), t(100));
        clock.advance(Duration::seconds(1));
        assert_eq!(series.append(dec!(2), None), t(101));

        assert_eq!(series.snapshot(), vec![(t(100), dec!(1)), (t(101), dec!(2))]);
    }

    #[test]
    fn test_repeated_timestamp_overwrites_in_place() {
        let mut series = TimeSeries::new(ManualClock::new(Some(t(0))));
        series.append(dec!(1), Some(t(1)));
        series.append(dec!(2), Some(t(2)));
        series.append(dec!(9), Some(t(1)));

        assert_eq!(series.len(), 2);
        assert_eq!(series.snapshot(), vec![(t(1), dec!(9)), (t(2), dec!(2))]);
        assert!(series.is_chronological());
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut series = TimeSeries::new(ManualClock::new(Some(t(0))));
        series.append(dec!(1), Some(t(1)));

        let snapshot = series.snapshot();
        series.append(dec!(2), Some(t(2)));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn test_out_of_order_insert_tracked() {
        let mut series = TimeSeries::from_entries(
            ManualClock::new(Some(t(0))),
            vec![(t(5), dec!(1)), (t(3), dec!(2))],
        );

        assert!(!series.is_chronological());
        assert_eq!(series.timestamps(), vec![t(5), t(3)]);

        series.evict_front(1);
        assert!(series.is_chronological());
        assert!(series.fresh().is_empty());
        assert_eq!(series.first(), Some((t(3), dec!(2))));
        assert_eq!(series.latest(), Some((t(3), dec!(2))));
    }
}
