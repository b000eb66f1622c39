use kestrel_core::{Price, Timestamp};
use std::sync::Arc;

/// Port for trading signal generation
///
/// Given the recorded price history of one symbol, decide whether to
/// emit an order. The order type is chosen by the caller; the engine only
/// cares whether one was produced.
///
/// Implementations run outside every storage lock, so they may be slow
/// without stalling tick ingestion.
pub trait SignalGenerator<O>: Send + Sync {
    /// Produce an order from a price series in insertion order, or nothing
    fn get_signal(&self, series: &[(Timestamp, Price)]) -> Option<O>;

    /// Get the generator's name for logging
    fn name(&self) -> &str {
        "SignalGenerator"
    }
}

impl<O, F> SignalGenerator<O> for F
where
    F: Fn(&[(Timestamp, Price)]) -> Option<O> + Send + Sync,
{
    fn get_signal(&self, series: &[(Timestamp, Price)]) -> Option<O> {
        self(series)
    }
}

/// Receives every order a signal generator produces
pub type OrderCallback<O> = Arc<dyn Fn(O) + Send + Sync>;
