//! Symbol to partition registry

use crate::partition::Partition;
use dashmap::DashMap;
use kestrel_core::Symbol;
use kestrel_ports::Clock;
use kestrel_timeseries::{RetentionPolicy, Series, SeriesResult};
use std::sync::Arc;

/// Produces a fresh, empty series for a newly seen symbol
pub type SeriesFactory = Arc<dyn Fn() -> Box<dyn Series> + Send + Sync>;

/// Per-symbol partitioned price storage
///
/// Lookups of existing partitions only take a shared shard lock. Creation
/// goes through the map's entry API, so concurrent first accesses to the
/// same symbol run the factory once and all observe the same partition.
pub struct Storage {
    partitions: DashMap<Symbol, Arc<Partition>>,
    factory: SeriesFactory,
}

impl Storage {
    /// Create storage that builds new partitions with `factory`
    pub fn new(factory: SeriesFactory) -> Self {
        Self {
            partitions: DashMap::new(),
            factory,
        }
    }

    /// Create storage whose partitions all follow `policy`
    ///
    /// The policy is checked once here; an invalid policy never reaches a
    /// partition.
    pub fn with_retention(policy: RetentionPolicy, clock: Arc<dyn Clock>) -> SeriesResult<Self> {
        let prototype: Arc<dyn Series> = Arc::from(policy.build(clock)?);
        log::debug!("Storage retention: {:?}", policy);

        Ok(Self::new(Arc::new(move || prototype.fresh())))
    }

    /// Get the partition for `symbol`, creating it on first access
    pub fn get(&self, symbol: &str) -> Arc<Partition> {
        let existing = self.partitions.get(symbol).map(|p| Arc::clone(p.value()));
        if let Some(partition) = existing {
            return partition;
        }

        let partition = self
            .partitions
            .entry(symbol.to_string())
            .or_insert_with(|| {
                log::debug!("Creating partition for {}", symbol);
                Arc::new(Partition::new(symbol.to_string(), (self.factory)()))
            });
        Arc::clone(partition.value())
    }

    /// Run `f` against `symbol`'s series under its partition lock
    ///
    /// The lock is released on every exit path, including a panic in `f`.
    pub fn with_partition<R>(&self, symbol: &str, f: impl FnOnce(&mut dyn Series) -> R) -> R {
        self.get(symbol).with(f)
    }

    /// Symbols with a partition, in no particular order
    pub fn symbols(&self) -> Vec<Symbol> {
        self.partitions.iter().map(|p| p.key().clone()).collect()
    }

    /// Check if `symbol` has a partition, without creating one
    pub fn contains(&self, symbol: &str) -> bool {
        self.partitions.contains_key(symbol)
    }

    /// Number of partitions
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// Check if no partition exists yet
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("partitions", &self.partitions.len())
            .finish_non_exhaustive()
    }
}
