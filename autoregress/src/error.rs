//! Error types for the autoregress crate

use thiserror::Error;
use window_prep::PrepError;

/// Errors raised while running or evaluating a forecaster
#[derive(Debug, Error)]
pub enum RolloutError {
    /// Invalid window shape, target index or step count
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The forecaster failed or produced a non-finite value
    #[error("Prediction failed at step {step}: {reason}")]
    PredictionFailure { step: usize, reason: String },

    /// The rollout was cancelled before all steps completed
    #[error("Rollout cancelled after {completed} steps")]
    Cancelled { completed: usize },

    /// Error raised by a forecaster or model implementation
    #[error("Model error: {0}")]
    ModelError(String),

    /// Error from loading prepared data or metadata
    #[error(transparent)]
    Prep(#[from] PrepError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error while writing the forecast document
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Error while writing the forecast table
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, RolloutError>;

impl From<serde_json::Error> for RolloutError {
    fn from(err: serde_json::Error) -> Self {
        RolloutError::SerializationError(err.to_string())
    }
}

impl From<csv::Error> for RolloutError {
    fn from(err: csv::Error) -> Self {
        RolloutError::CsvError(err.to_string())
    }
}
