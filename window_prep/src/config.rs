//! Preparation parameters

use crate::error::{PrepError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Default number of past steps per input window
pub const DEFAULT_WINDOW: usize = 48;
/// Default number of future target steps per sample
pub const DEFAULT_HORIZON: usize = 1;
/// Default train and validation ratios; the remainder is the test ratio
pub const DEFAULT_SPLIT_RATIOS: (f64, f64) = (0.7, 0.15);

/// Which scale the target sequences are emitted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetScaling {
    /// Raw target column values
    #[default]
    Raw,
    /// Target column standardized with its own train-only mean and std
    Standardized,
}

/// Configuration for [`crate::prepare`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepareConfig {
    /// Ordered feature columns forming each window row
    pub feature_cols: Vec<String>,
    /// Target column
    pub target_col: String,
    /// Input window length in time steps
    #[serde(default = "default_window")]
    pub window: usize,
    /// Number of target steps following each window
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    /// Train and validation ratios applied to row counts
    #[serde(default = "default_split_ratios")]
    pub split_ratios: (f64, f64),
    /// Column to sort by before splitting, if any
    #[serde(default)]
    pub datetime_col: Option<String>,
    /// Scale of the emitted targets
    #[serde(default)]
    pub target_scaling: TargetScaling,
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

fn default_split_ratios() -> (f64, f64) {
    DEFAULT_SPLIT_RATIOS
}

impl PrepareConfig {
    /// Create a configuration with default window, horizon and ratios
    pub fn new<S: Into<String>>(feature_cols: Vec<S>, target_col: impl Into<String>) -> Self {
        Self {
            feature_cols: feature_cols.into_iter().map(Into::into).collect(),
            target_col: target_col.into(),
            window: DEFAULT_WINDOW,
            horizon: DEFAULT_HORIZON,
            split_ratios: DEFAULT_SPLIT_RATIOS,
            datetime_col: None,
            target_scaling: TargetScaling::default(),
        }
    }

    /// Set the window length
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Set the horizon
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    /// Set the train and validation ratios
    pub fn with_split_ratios(mut self, train: f64, val: f64) -> Self {
        self.split_ratios = (train, val);
        self
    }

    /// Sort rows by this column before splitting
    pub fn with_datetime_column(mut self, name: impl Into<String>) -> Self {
        self.datetime_col = Some(name.into());
        self
    }

    /// Set the target scale
    pub fn with_target_scaling(mut self, scaling: TargetScaling) -> Self {
        self.target_scaling = scaling;
        self
    }

    /// Load a configuration from a JSON document
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// The implicit test ratio
    pub fn test_ratio(&self) -> f64 {
        1.0 - self.split_ratios.0 - self.split_ratios.1
    }

    /// Check the parameters that don't depend on the table
    pub fn validate(&self) -> Result<()> {
        if self.feature_cols.is_empty() {
            return Err(PrepError::ConfigurationError(
                "feature_cols: at least one feature column is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.feature_cols {
            if !seen.insert(name.as_str()) {
                return Err(PrepError::ConfigurationError(format!(
                    "feature_cols: column '{}' is listed more than once",
                    name
                )));
            }
        }

        if self.target_col.is_empty() {
            return Err(PrepError::ConfigurationError(
                "target_col: must not be empty".to_string(),
            ));
        }

        if self.window == 0 {
            return Err(PrepError::ConfigurationError(
                "window: must be at least 1".to_string(),
            ));
        }

        if self.horizon == 0 {
            return Err(PrepError::ConfigurationError(
                "horizon: must be at least 1".to_string(),
            ));
        }

        let (train, val) = self.split_ratios;
        for (label, ratio) in [("train", train), ("validation", val)] {
            if !(ratio > 0.0 && ratio < 1.0) {
                return Err(PrepError::ConfigurationError(format!(
                    "split_ratios: {} ratio {} must be in (0, 1)",
                    label, ratio
                )));
            }
        }
        if train + val >= 1.0 {
            return Err(PrepError::ConfigurationError(format!(
                "split_ratios: train + validation ({}) must be below 1",
                train + val
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base() -> PrepareConfig {
        PrepareConfig::new(vec!["temp", "rh"], "temp")
    }

    #[test]
    fn test_defaults() {
        let config = base();
        assert_eq!(config.window, 48);
        assert_eq!(config.horizon, 1);
        assert_eq!(config.split_ratios, (0.7, 0.15));
        assert_eq!(config.target_scaling, TargetScaling::Raw);
        assert!(config.validate().is_ok());
        assert!((config.test_ratio() - 0.15).abs() < 1e-12);
    }

    #[rstest]
    #[case::no_features(PrepareConfig::new(Vec::<String>::new(), "temp"), "feature_cols")]
    #[case::duplicate_feature(PrepareConfig::new(vec!["temp", "temp"], "temp"), "feature_cols")]
    #[case::zero_window(base().with_window(0), "window")]
    #[case::zero_horizon(base().with_horizon(0), "horizon")]
    #[case::train_ratio_zero(base().with_split_ratios(0.0, 0.2), "split_ratios")]
    #[case::val_ratio_one(base().with_split_ratios(0.2, 1.0), "split_ratios")]
    #[case::ratios_sum_to_one(base().with_split_ratios(0.6, 0.4), "split_ratios")]
    #[case::nan_ratio(base().with_split_ratios(f64::NAN, 0.1), "split_ratios")]
    fn test_invalid_config_names_parameter(#[case] config: PrepareConfig, #[case] param: &str) {
        match config.validate() {
            Err(PrepError::ConfigurationError(msg)) => assert!(msg.starts_with(param), "{}", msg),
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_defaults_fill_missing_fields() {
        let config: PrepareConfig =
            serde_json::from_str(r#"{"feature_cols": ["temp"], "target_col": "temp", "window": 8}"#)
                .unwrap();
        assert_eq!(config.window, 8);
        assert_eq!(config.horizon, DEFAULT_HORIZON);
        assert_eq!(config.split_ratios, DEFAULT_SPLIT_RATIOS);
        assert_eq!(config.datetime_col, None);
    }
}
