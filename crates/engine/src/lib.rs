//! Kestrel Engine
//!
//! Drives per-symbol traders over a shared [`kestrel_storage::Storage`]:
//!
//! - [`Engine`] - validates and ingests ticks, starts and stops traders
//! - [`Trader`] - background task that snapshots one symbol, asks a signal
//!   generator for an order and dispatches it
//! - [`ReplayEngine`] - replays recorded ticks and evaluates on tick counts
//!   instead of wall-clock time
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kestrel_engine::{Engine, EngineConfig, Trader};
//!
//! let engine = Engine::new(EngineConfig::default(), |symbol: &str, storage| {
//!     Trader::new(symbol, storage, my_signal, Arc::new(|order| route(order)))
//! })?;
//!
//! engine.tick(&TickRecord::unstamped("BTCUSD", dec!(42000)))?;
//! engine.start("BTCUSD")?;
//! // ...
//! engine.shutdown().await;
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod replay;
pub mod trader;

pub use config::{ConfigError, EngineConfig};
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use replay::{ReplayEngine, ReplayReport};
pub use trader::{Trader, TraderFactory, TraderState};
