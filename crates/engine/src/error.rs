use kestrel_core::{Symbol, ValidationError};
use kestrel_timeseries::SeriesError;
use thiserror::Error;

/// Errors surfaced by the engine and its traders
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Trader already running for {symbol}")]
    AlreadyRunning { symbol: Symbol },

    #[error("No trader running for {symbol}")]
    NotRunning { symbol: Symbol },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Series(#[from] SeriesError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("No Tokio runtime available to run the trader")]
    NoRuntime,
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
