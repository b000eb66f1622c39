//! Tick ingestion and trader registry

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::trader::{Trader, TraderFactory};
use kestrel_clock::SystemClock;
use kestrel_core::{Symbol, TickRecord, Timestamp};
use kestrel_ports::Clock;
use kestrel_storage::Storage;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Front door for ticks and per-symbol trader lifecycle
///
/// The registry lock is only held while the trader map changes. It never
/// wraps a partition lock, and no partition lock is held while it is taken.
pub struct Engine<O> {
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    storage: Arc<Storage>,
    factory: Arc<dyn TraderFactory<O>>,
    traders: Mutex<HashMap<Symbol, Trader<O>>>,
}

impl<O: Send + 'static> Engine<O> {
    /// Create an engine on the system clock
    pub fn new(config: EngineConfig, factory: impl TraderFactory<O> + 'static) -> EngineResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock::new()), factory)
    }

    /// Create an engine whose unstamped ticks are timed by `clock`
    pub fn with_clock(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        factory: impl TraderFactory<O> + 'static,
    ) -> EngineResult<Self> {
        if config.eval_interval_ms == 0 {
            return Err(EngineError::InvalidArgument(
                "eval_interval_ms must be at least 1".to_string(),
            ));
        }

        let storage = Storage::with_retention(config.retention.clone(), Arc::clone(&clock))?;
        log::info!(
            "Engine ready ({}, {:?} retention, {}ms eval interval)",
            clock.name(),
            config.retention,
            config.eval_interval_ms
        );

        Ok(Self {
            config,
            clock,
            storage: Arc::new(storage),
            factory: Arc::new(factory),
            traders: Mutex::new(HashMap::new()),
        })
    }

    /// Validate a tick and append it to its symbol's series
    ///
    /// Returns the recorded timestamp. No evaluation happens here.
    pub fn tick(&self, record: &TickRecord) -> EngineResult<Timestamp> {
        record.validate()?;

        let recorded = self.storage.with_partition(&record.symbol, |series| {
            series.append(record.price, record.timestamp)
        });
        log::trace!("[{}] tick {} @ {}", record.symbol, record.price, recorded);

        Ok(recorded)
    }

    /// Parse, validate and ingest a raw JSON tick payload
    pub fn tick_json(&self, json: &str) -> EngineResult<Timestamp> {
        let record = TickRecord::from_json(json)?;
        self.tick(&record)
    }

    /// Start a trader for `symbol` on the current Tokio runtime
    ///
    /// The factory is called under the registry lock and must not call back
    /// into the engine.
    pub fn start(&self, symbol: &str) -> EngineResult<()> {
        let mut traders = self.traders.lock();
        if traders.contains_key(symbol) {
            return Err(EngineError::AlreadyRunning {
                symbol: symbol.to_string(),
            });
        }

        let mut trader = self.build_trader(symbol);
        trader.run()?;
        traders.insert(symbol.to_string(), trader);

        log::info!("[{}] Started trading", symbol);
        Ok(())
    }

    /// Build a trader for `symbol` without registering or running it
    pub(crate) fn build_trader(&self, symbol: &str) -> Trader<O> {
        self.factory
            .new_trader(symbol, Arc::clone(&self.storage))
            .with_interval(self.config.eval_interval())
    }
}

impl<O> Engine<O> {
    /// Stop the trader for `symbol`
    ///
    /// The trader is removed and asked to stop; the detached handle is
    /// returned so the caller can `join()` it.
    pub fn stop(&self, symbol: &str) -> EngineResult<Trader<O>> {
        let trader = self
            .traders
            .lock()
            .remove(symbol)
            .ok_or_else(|| EngineError::NotRunning {
                symbol: symbol.to_string(),
            })?;

        trader.request_stop();
        log::info!("[{}] Stopped trading", symbol);
        Ok(trader)
    }

    /// Ask every running trader to stop, returning their handles
    pub fn stop_all(&self) -> Vec<Trader<O>> {
        let traders: Vec<_> = self.traders.lock().drain().map(|(_, t)| t).collect();
        for trader in &traders {
            trader.request_stop();
        }

        if !traders.is_empty() {
            log::info!("Stopped {} traders", traders.len());
        }
        traders
    }

    /// Stop every trader and wait for all of them to exit
    pub async fn shutdown(&self) {
        for mut trader in self.stop_all() {
            trader.join().await;
        }
    }

    /// Check if a trader is registered for `symbol`
    pub fn is_running(&self, symbol: &str) -> bool {
        self.traders.lock().contains_key(symbol)
    }

    /// Symbols with a registered trader, sorted
    pub fn running_symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<_> = self.traders.lock().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Shared tick storage
    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Clock used for unstamped ticks
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
