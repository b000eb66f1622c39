use chrono::{Duration, Utc};
use kestrel_core::Timestamp;
use kestrel_ports::Clock;
use parking_lot::RwLock;
use std::sync::Arc;

/// Deterministic clock that only moves when told to
///
/// Replays and tests use this so that unstamped ticks receive reproducible
/// timestamps. An optional auto-step advances the clock after every read,
/// which gives each unstamped tick a distinct timestamp.
pub struct ManualClock {
    /// Current time
    current: RwLock<Timestamp>,
    /// Amount added after each `now()` call
    step: Duration,
}

impl ManualClock {
    /// Create a frozen clock
    ///
    /// # Arguments
    /// * `initial_time` - Optional starting time. If None, uses current wall time.
    pub fn new(initial_time: Option<Timestamp>) -> Arc<Self> {
        Self::with_step(initial_time, Duration::zero())
    }

    /// Create a clock that advances by `step` every time it is read
    pub fn with_step(initial_time: Option<Timestamp>, step: Duration) -> Arc<Self> {
        Arc::new(Self {
            current: RwLock::new(initial_time.unwrap_or_else(Utc::now)),
            step,
        })
    }

    /// Advance the clock by a specified duration
    pub fn advance(&self, duration: Duration) {
        *self.current.write() += duration;
    }

    /// Explicitly set the time
    ///
    /// Warning: moving backwards makes subsequent unstamped appends out of order.
    pub fn set_time(&self, time: Timestamp) {
        *self.current.write() = time;
    }

    /// Read the time without applying the auto-step
    pub fn peek(&self) -> Timestamp {
        *self.current.read()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let mut current = self.current.write();
        let now = *current;
        *current += self.step;
        now
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
