//! Error types for the window_prep crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while loading, scaling or windowing a time series
#[derive(Debug, Error)]
pub enum PrepError {
    /// Invalid window, horizon, split ratios or column selection
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The input table has no rows
    #[error("Empty input: {0}")]
    EmptyInputError(String),

    /// The input is too short for the requested window and horizon
    #[error("Insufficient data: {0}")]
    InsufficientDataError(String),

    /// Error related to data validation or conversion
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error while reading or writing the metadata document
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error while reading or writing `.npy` tensors
    #[error("Npy error: {0}")]
    NpyError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, PrepError>;

impl From<PolarsError> for PrepError {
    fn from(err: PolarsError) -> Self {
        PrepError::PolarsError(err.to_string())
    }
}

impl From<serde_json::Error> for PrepError {
    fn from(err: serde_json::Error) -> Self {
        PrepError::SerializationError(err.to_string())
    }
}

impl From<ndarray_npy::WriteNpyError> for PrepError {
    fn from(err: ndarray_npy::WriteNpyError) -> Self {
        PrepError::NpyError(err.to_string())
    }
}

impl From<ndarray_npy::ReadNpyError> for PrepError {
    fn from(err: ndarray_npy::ReadNpyError) -> Self {
        PrepError::NpyError(err.to_string())
    }
}
