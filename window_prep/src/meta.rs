//! Metadata describing a prepared dataset

use crate::config::TargetScaling;
use crate::error::{PrepError, Result};
use crate::scaler::{FeatureScaler, TargetScaler};
use serde::{Deserialize, Serialize};

/// Fitted normalization parameters, stored alongside the tensors so
/// inference can reapply or invert them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub feature_means: Vec<f64>,
    pub feature_stds: Vec<f64>,
    pub target_mean: f64,
    pub target_std: f64,
}

/// Shape and column layout of a prepared dataset.
///
/// This is what rollouts read to learn the window shape, the feature order
/// and which feature column holds the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMeta {
    pub window: usize,
    pub horizon: usize,
    pub num_features: usize,
    pub feature_cols: Vec<String>,
    pub target_col: String,
    /// Train, validation and test ratios
    pub split_ratio: [f64; 3],
    #[serde(default)]
    pub target_scaling: TargetScaling,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<ScalerParams>,
}

impl ForecastMeta {
    /// Position of the target column among the feature columns
    pub fn target_feature_index(&self) -> Result<usize> {
        self.feature_cols
            .iter()
            .position(|c| *c == self.target_col)
            .ok_or_else(|| {
                PrepError::ConfigurationError(format!(
                    "target_col: '{}' is not one of the feature columns {:?}",
                    self.target_col, self.feature_cols
                ))
            })
    }

    /// Expected `(W, F)` shape of one input window
    pub fn window_shape(&self) -> (usize, usize) {
        (self.window, self.num_features)
    }

    /// Rebuild the feature scaler, if parameters were stored
    pub fn feature_scaler(&self) -> Option<Result<FeatureScaler>> {
        self.scaler.as_ref().map(|p| {
            FeatureScaler::from_parts(p.feature_means.clone(), p.feature_stds.clone())
        })
    }

    /// Scaler that maps predictions back to target units. Raw targets need
    /// no mapping and return `None`.
    pub fn target_scaler(&self) -> Option<TargetScaler> {
        match self.target_scaling {
            TargetScaling::Raw => None,
            TargetScaling::Standardized => self.scaler.as_ref().map(|p| TargetScaler {
                mean: p.target_mean,
                std: p.target_std,
            }),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
