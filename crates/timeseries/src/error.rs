//! Error types for the timeseries crate

use thiserror::Error;

/// Series construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type SeriesResult<T> = std::result::Result<T, SeriesError>;
