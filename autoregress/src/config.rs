//! Rollout configuration

use crate::error::{Result, RolloutError};
use crate::forecast::parse_interval;
use crate::rollout::DEFAULT_STEPS;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_steps() -> usize {
    DEFAULT_STEPS
}

/// How far to roll a forecaster forward and how to stamp the results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloutConfig {
    /// Number of autoregressive steps
    #[serde(default = "default_steps")]
    pub steps: usize,

    /// Spacing between forecast points, e.g. `"3h"`; no timestamps when unset
    #[serde(default)]
    pub interval: Option<String>,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            interval: None,
        }
    }
}

impl RolloutConfig {
    pub fn new(steps: usize) -> Self {
        Self {
            steps,
            interval: None,
        }
    }

    /// Set the step interval used for forecast timestamps
    pub fn with_interval(mut self, interval: impl Into<String>) -> Self {
        self.interval = Some(interval.into());
        self
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Parsed step interval, if one is configured
    pub fn interval(&self) -> Result<Option<Duration>> {
        self.interval.as_deref().map(parse_interval).transpose()
    }

    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(RolloutError::ConfigurationError(
                "steps: must be at least 1".to_string(),
            ));
        }
        self.interval()?;
        Ok(())
    }
}
