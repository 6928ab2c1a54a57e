//! Forecaster capability and a reference trainable model

use crate::error::{Result, RolloutError};
use ndarray::{s, ArrayView2, ArrayView3};
use std::fmt::Debug;

/// Single-step predictor: one `(1, W, F)` batch in, one point forecast out.
///
/// Implementations are assumed pure for a fixed model artifact.
pub trait Forecaster {
    /// Predict the next value of the target
    fn predict(&self, batch: ArrayView3<'_, f64>) -> Result<f64>;

    /// Name of the forecaster
    fn name(&self) -> &str {
        "forecaster"
    }
}

impl<F> Forecaster for F
where
    F: Fn(ArrayView3<'_, f64>) -> Result<f64>,
{
    fn predict(&self, batch: ArrayView3<'_, f64>) -> Result<f64> {
        self(batch)
    }
}

/// Untrained model configuration that produces a [`Forecaster`]
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: Forecaster;

    /// Fit on windowed inputs `(n, W, F)` and targets `(n, H)`
    fn train(&self, inputs: ArrayView3<'_, f64>, targets: ArrayView2<'_, f64>)
        -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

/// Least-squares line from the mean of the last `lookback` values of the
/// target feature to the first target step.
///
/// With `lookback = 1` this is a calibrated persistence forecast; the
/// regression also absorbs the gap between normalized window values and raw
/// targets.
#[derive(Debug, Clone)]
pub struct LaggedMeanRegression {
    name: String,
    lookback: usize,
    target_feature_index: usize,
}

/// Trained [`LaggedMeanRegression`]
#[derive(Debug, Clone)]
pub struct TrainedLaggedMean {
    name: String,
    lookback: usize,
    target_feature_index: usize,
    slope: f64,
    intercept: f64,
}

fn lagged_mean(window: ArrayView2<'_, f64>, lookback: usize, column: usize) -> f64 {
    let rows = window.nrows();
    window
        .slice(s![rows - lookback.., column])
        .iter()
        .sum::<f64>()
        / lookback as f64
}

impl LaggedMeanRegression {
    /// Create a new model averaging the last `lookback` steps of the feature
    /// at `target_feature_index`
    pub fn new(lookback: usize, target_feature_index: usize) -> Result<Self> {
        if lookback == 0 {
            return Err(RolloutError::ConfigurationError(
                "lookback: must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Lagged Mean Regression (lookback={})", lookback),
            lookback,
            target_feature_index,
        })
    }
}

impl ForecastModel for LaggedMeanRegression {
    type Trained = TrainedLaggedMean;

    fn train(
        &self,
        inputs: ArrayView3<'_, f64>,
        targets: ArrayView2<'_, f64>,
    ) -> Result<Self::Trained> {
        let (n, window, features) = inputs.dim();
        if n == 0 || targets.nrows() != n || targets.ncols() == 0 {
            return Err(RolloutError::ModelError(format!(
                "Training needs matching non-empty inputs and targets, got {} windows and {:?} targets",
                n,
                targets.dim()
            )));
        }
        if self.lookback > window {
            return Err(RolloutError::ConfigurationError(format!(
                "lookback: {} exceeds window length {}",
                self.lookback, window
            )));
        }
        if self.target_feature_index >= features {
            return Err(RolloutError::ConfigurationError(format!(
                "target_feature_index: {} out of range for {} features",
                self.target_feature_index, features
            )));
        }

        let xs: Vec<f64> = (0..n)
            .map(|i| {
                lagged_mean(
                    inputs.slice(s![i, .., ..]),
                    self.lookback,
                    self.target_feature_index,
                )
            })
            .collect();
        let ys: Vec<f64> = targets.column(0).to_vec();

        let x_mean = xs.iter().sum::<f64>() / n as f64;
        let y_mean = ys.iter().sum::<f64>() / n as f64;

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (x, y) in xs.iter().zip(ys.iter()) {
            numerator += (x - x_mean) * (y - y_mean);
            denominator += (x - x_mean) * (x - x_mean);
        }

        // Flat inputs carry no signal; fall back to the target mean
        let slope = if denominator.abs() < 1e-10 {
            0.0
        } else {
            numerator / denominator
        };
        let intercept = y_mean - slope * x_mean;

        if !(slope.is_finite() && intercept.is_finite()) {
            return Err(RolloutError::ModelError(
                "Regression produced non-finite parameters".to_string(),
            ));
        }

        tracing::debug!(slope, intercept, samples = n, "trained lagged mean regression");

        Ok(TrainedLaggedMean {
            name: self.name.clone(),
            lookback: self.lookback,
            target_feature_index: self.target_feature_index,
            slope,
            intercept,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedLaggedMean {
    /// Fitted slope
    pub fn slope(&self) -> f64 {
        self.slope
    }

    /// Fitted intercept
    pub fn intercept(&self) -> f64 {
        self.intercept
    }
}

impl Forecaster for TrainedLaggedMean {
    fn predict(&self, batch: ArrayView3<'_, f64>) -> Result<f64> {
        let (batch_size, window, features) = batch.dim();
        if batch_size != 1 {
            return Err(RolloutError::ModelError(format!(
                "Expected a batch of one window, got {}",
                batch_size
            )));
        }
        if window < self.lookback || features <= self.target_feature_index {
            return Err(RolloutError::ModelError(format!(
                "Window shape ({}, {}) too small for lookback {} and feature {}",
                window, features, self.lookback, self.target_feature_index
            )));
        }

        let x = lagged_mean(
            batch.slice(s![0, .., ..]),
            self.lookback,
            self.target_feature_index,
        );
        Ok(self.slope * x + self.intercept)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
