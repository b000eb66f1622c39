use kestrel_core::Timestamp;

/// Source of "now" for ticks that arrive without a timestamp
///
/// Series consult it only at append time. Retention never reads it; horizon
/// age is measured from the newest recorded timestamp. Swap in a manual
/// clock to make unstamped ingestion reproducible.
pub trait Clock: Send + Sync {
    /// Current time in UTC
    fn now(&self) -> Timestamp;

    /// Label used in engine startup logs
    fn name(&self) -> &str {
        "Clock"
    }
}
