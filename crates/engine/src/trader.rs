//! Per-symbol trader
//!
//! A trader periodically snapshots one symbol's series, asks its signal
//! generator for an order, and hands any order to its callback.
//!
//! ```text
//! Idle --run()--> Running --request_stop()--> StopRequested --loop exit--> Stopped
//! ```
//!
//! The stop flag is only checked at the top of each iteration, so a trader
//! sleeping between evaluations finishes that sleep before it stops.
//!
//! Each evaluation runs on Tokio's blocking pool, so a slow signal generator
//! or callback delays only its own trader.

use crate::error::{EngineError, EngineResult};
use kestrel_core::Symbol;
use kestrel_ports::{OrderCallback, SignalGenerator};
use kestrel_storage::Storage;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::{self, JoinHandle};

/// Lifecycle state of a trader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraderState {
    /// Constructed, never run
    Idle,
    /// Background loop active
    Running,
    /// Stop flag set, loop has not observed it yet
    StopRequested,
    /// Background loop exited
    Stopped,
}

/// State shared between a trader handle and its background task
struct TraderCore<O> {
    symbol: Symbol,
    storage: Arc<Storage>,
    signal: Box<dyn SignalGenerator<O>>,
    callback: OrderCallback<O>,
    stop: AtomicBool,
    state: Mutex<TraderState>,
}

impl<O> TraderCore<O> {
    /// Snapshot under the partition lock, then signal and dispatch outside it
    fn evaluate(&self) -> bool {
        let snapshot = self
            .storage
            .with_partition(&self.symbol, |series| series.snapshot());

        match self.signal.get_signal(&snapshot) {
            Some(order) => {
                log::debug!(
                    "[{}] {} produced an order from {} prices",
                    self.symbol,
                    self.signal.name(),
                    snapshot.len()
                );
                (self.callback)(order);
                true
            }
            None => false,
        }
    }

    fn set_state(&self, state: TraderState) {
        *self.state.lock() = state;
    }
}

/// Background worker evaluating one symbol on a fixed interval
pub struct Trader<O> {
    core: Arc<TraderCore<O>>,
    interval: Duration,
    handle: Option<JoinHandle<()>>,
}

impl<O: Send + 'static> Trader<O> {
    /// Create an idle trader for `symbol`
    ///
    /// The evaluation interval defaults to one second.
    pub fn new(
        symbol: impl Into<Symbol>,
        storage: Arc<Storage>,
        signal: impl SignalGenerator<O> + 'static,
        callback: OrderCallback<O>,
    ) -> Self {
        Self {
            core: Arc::new(TraderCore {
                symbol: symbol.into(),
                storage,
                signal: Box::new(signal),
                callback,
                stop: AtomicBool::new(false),
                state: Mutex::new(TraderState::Idle),
            }),
            interval: Duration::from_millis(crate::config::DEFAULT_EVAL_INTERVAL_MS),
            handle: None,
        }
    }

    /// Builder: set the time between evaluations
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Start the background loop on the current Tokio runtime
    ///
    /// A stopped trader may be run again. Fails with `AlreadyRunning` while a
    /// previous loop is still active and with `NoRuntime` when called outside
    /// a runtime.
    pub fn run(&mut self) -> EngineResult<()> {
        let runtime = Handle::try_current().map_err(|_| EngineError::NoRuntime)?;

        {
            let mut state = self.core.state.lock();
            if matches!(*state, TraderState::Running | TraderState::StopRequested) {
                return Err(EngineError::AlreadyRunning {
                    symbol: self.core.symbol.clone(),
                });
            }
            self.core.stop.store(false, Ordering::SeqCst);
            *state = TraderState::Running;
        }

        self.handle = Some(runtime.spawn(Self::run_loop(
            Arc::clone(&self.core),
            self.interval,
        )));
        Ok(())
    }

    async fn run_loop(core: Arc<TraderCore<O>>, interval: Duration) {
        log::info!(
            "[{}] Trader started ({:?} interval, {})",
            core.symbol,
            interval,
            core.signal.name()
        );

        loop {
            if core.stop.load(Ordering::SeqCst) {
                break;
            }

            // Pluggable code may block, so keep it off the async workers
            let evaluation = Arc::clone(&core);
            match task::spawn_blocking(move || evaluation.evaluate()).await {
                Ok(_) => {}
                Err(e) if e.is_panic() => {
                    let payload = e.into_panic();
                    log::error!(
                        "[{}] Evaluation panicked: {}",
                        core.symbol,
                        panic_message(payload.as_ref())
                    );
                }
                Err(e) => {
                    log::error!("[{}] Evaluation did not complete: {}", core.symbol, e);
                }
            }

            tokio::time::sleep(interval).await;
        }

        core.set_state(TraderState::Stopped);
        log::info!("[{}] Trader stopped", core.symbol);
    }
}

impl<O> Trader<O> {
    /// Ask the background loop to exit; never blocks
    pub fn request_stop(&self) {
        self.core.stop.store(true, Ordering::SeqCst);

        let mut state = self.core.state.lock();
        if *state == TraderState::Running {
            *state = TraderState::StopRequested;
        }
    }

    /// Wait for the background loop to exit
    ///
    /// Returns immediately if the trader was never run. Waits indefinitely
    /// unless a stop has been requested.
    pub async fn join(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        if let Err(e) = handle.await {
            log::error!("[{}] Trader task failed: {}", self.core.symbol, e);
            self.core.set_state(TraderState::Stopped);
        }
    }

    /// Run one evaluation on the calling thread
    ///
    /// Works in any state and never changes it. Unlike the background loop,
    /// a panic in the signal generator or callback reaches the caller.
    /// Returns whether an order was dispatched.
    pub fn force_evaluate(&self) -> bool {
        self.core.evaluate()
    }

    /// Symbol this trader evaluates
    pub fn symbol(&self) -> &str {
        &self.core.symbol
    }

    /// Current lifecycle state
    pub fn state(&self) -> TraderState {
        *self.core.state.lock()
    }

    /// Check if the background loop is active and not asked to stop
    pub fn is_running(&self) -> bool {
        self.state() == TraderState::Running
    }

    /// Time between evaluations
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl<O> Drop for Trader<O> {
    fn drop(&mut self) {
        // A detached task must not outlive its handle
        if self.handle.is_some() {
            self.core.stop.store(true, Ordering::SeqCst);
        }
    }
}

impl<O> std::fmt::Debug for Trader<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trader")
            .field("symbol", &self.core.symbol)
            .field("state", &self.state())
            .field("interval", &self.interval)
            .finish()
    }
}

/// Builds the trader for a symbol when the engine starts it
pub trait TraderFactory<O>: Send + Sync {
    fn new_trader(&self, symbol: &str, storage: Arc<Storage>) -> Trader<O>;
}

impl<O, F> TraderFactory<O> for F
where
    F: Fn(&str, Arc<Storage>) -> Trader<O> + Send + Sync,
{
    fn new_trader(&self, symbol: &str, storage: Arc<Storage>) -> Trader<O> {
        self(symbol, storage)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
