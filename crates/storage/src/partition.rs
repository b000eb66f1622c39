//! A single symbol's series and its lock

use kestrel_core::Symbol;
use kestrel_timeseries::Series;
use parking_lot::{Mutex, MutexGuard};

/// One symbol's series, guarded by its own mutex
pub struct Partition {
    symbol: Symbol,
    series: Mutex<Box<dyn Series>>,
}

impl Partition {
    pub(crate) fn new(symbol: Symbol, series: Box<dyn Series>) -> Self {
        Self {
            symbol,
            series: Mutex::new(series),
        }
    }

    /// Symbol this partition belongs to
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Acquire the partition lock
    ///
    /// The lock is released when the guard drops, including during unwinding.
    /// Prefer [`Storage::with_partition`](crate::Storage::with_partition),
    /// which cannot leak the guard.
    pub fn lock(&self) -> MutexGuard<'_, Box<dyn Series>> {
        self.series.lock()
    }

    /// Run `f` against the series while holding the lock
    pub fn with<R>(&self, f: impl FnOnce(&mut dyn Series) -> R) -> R {
        let mut series = self.series.lock();
        f(series.as_mut())
    }
}

impl std::fmt::Debug for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partition")
            .field("symbol", &self.symbol)
            .finish_non_exhaustive()
    }
}
