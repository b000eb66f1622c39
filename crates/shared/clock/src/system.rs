use chrono::Utc;
use kestrel_core::Timestamp;
use kestrel_ports::Clock;

/// Wall clock used to stamp ticks that arrive without a timestamp
///
/// Readings are UTC and not guaranteed monotonic, so a horizon series fed
/// only unstamped ticks can see the occasional step backwards.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}
