//! Autoregressive multi-step rollout
//!
//! Each step predicts on the current window, records the prediction and feeds
//! it back into the target column of a new last row. Non-target covariates
//! are held at their last observed values, so error compounds with the
//! number of steps.

use crate::error::{Result, RolloutError};
use crate::models::Forecaster;
use crate::rolling::RollingWindow;
use ndarray::ArrayView2;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use window_prep::{ForecastMeta, TargetScaling};

/// Default number of steps: five days of 3-hour steps
pub const DEFAULT_STEPS: usize = 40;

/// Cooperative cancellation shared between a rollout and its caller
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that running rollouts stop before their next step
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Lazy sequence of forecasts.
///
/// Yields at most `steps` items and stops after the first error. It can only
/// be restarted by building a new one from a fresh window.
#[derive(Debug)]
pub struct Rollout<'a, F: Forecaster + ?Sized> {
    window: RollingWindow,
    forecaster: &'a F,
    steps: usize,
    completed: usize,
    cancel: Option<&'a CancellationFlag>,
    finished: bool,
}

impl<'a, F: Forecaster + ?Sized> Rollout<'a, F> {
    /// Start a rollout from a copy of `initial_window`
    pub fn new(
        initial_window: ArrayView2<'_, f64>,
        target_feature_index: usize,
        steps: usize,
        forecaster: &'a F,
    ) -> Result<Self> {
        if steps == 0 {
            return Err(RolloutError::ConfigurationError(
                "steps: must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            window: RollingWindow::new(initial_window, target_feature_index)?,
            forecaster,
            steps,
            completed: 0,
            cancel: None,
            finished: false,
        })
    }

    /// Standardize predictions with `mean` and `std` before feeding them back
    pub fn with_feedback_scale(mut self, mean: f64, std: f64) -> Result<Self> {
        self.window = self.window.with_feedback_scale(mean, std)?;
        Ok(self)
    }

    /// Check `flag` before every step
    pub fn with_cancellation(mut self, flag: &'a CancellationFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Current rolling window
    pub fn window(&self) -> &RollingWindow {
        &self.window
    }

    /// Number of predictions produced so far
    pub fn completed(&self) -> usize {
        self.completed
    }

    fn step(&mut self) -> Result<f64> {
        if self.cancel.map_or(false, CancellationFlag::is_cancelled) {
            return Err(RolloutError::Cancelled {
                completed: self.completed,
            });
        }

        let step = self.completed + 1;
        let prediction = self
            .forecaster
            .predict(self.window.as_batch())
            .map_err(|e| RolloutError::PredictionFailure {
                step,
                reason: e.to_string(),
            })?;

        if !prediction.is_finite() {
            return Err(RolloutError::PredictionFailure {
                step,
                reason: format!("forecaster returned non-finite value {}", prediction),
            });
        }

        debug!(step, prediction, "rollout step");
        self.window.advance(prediction);
        self.completed = step;
        Ok(prediction)
    }
}

impl<'a, F: Forecaster + ?Sized> Iterator for Rollout<'a, F> {
    type Item = Result<f64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.completed >= self.steps {
            return None;
        }
        let result = self.step();
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (0, Some(self.steps - self.completed))
        }
    }
}

/// Produce `steps` forecasts, feeding each one back into the window.
///
/// Fails as a whole if any step fails; no partial sequence is returned.
pub fn rollout<F: Forecaster + ?Sized>(
    initial_window: ArrayView2<'_, f64>,
    target_feature_index: usize,
    steps: usize,
    forecaster: &F,
) -> Result<Vec<f64>> {
    let run = Rollout::new(initial_window, target_feature_index, steps, forecaster)?;
    collect(run)
}

/// [`rollout`] that stops early with [`RolloutError::Cancelled`] once `flag`
/// is set
pub fn rollout_with_cancellation<F: Forecaster + ?Sized>(
    initial_window: ArrayView2<'_, f64>,
    target_feature_index: usize,
    steps: usize,
    forecaster: &F,
    flag: &CancellationFlag,
) -> Result<Vec<f64>> {
    let run = Rollout::new(initial_window, target_feature_index, steps, forecaster)?
        .with_cancellation(flag);
    collect(run)
}

/// [`rollout`] with the window shape checked against `meta` and the target
/// column resolved from it.
///
/// With raw targets and stored scaler parameters, each prediction is
/// standardized with the target column's training statistics before it is
/// fed back; the returned values stay in target units.
pub fn rollout_with_meta<F: Forecaster + ?Sized>(
    initial_window: ArrayView2<'_, f64>,
    meta: &ForecastMeta,
    steps: usize,
    forecaster: &F,
) -> Result<Vec<f64>> {
    if initial_window.dim() != meta.window_shape() {
        return Err(RolloutError::ConfigurationError(format!(
            "initial_window: shape {:?} doesn't match metadata {:?}",
            initial_window.dim(),
            meta.window_shape()
        )));
    }
    let target_index = meta
        .target_feature_index()
        .map_err(|e| RolloutError::ConfigurationError(e.to_string()))?;

    let mut run = Rollout::new(initial_window, target_index, steps, forecaster)?;
    if let Some((mean, std)) = feedback_scale(meta, target_index)? {
        run = run.with_feedback_scale(mean, std)?;
    }
    collect(run)
}

/// Statistics that map a raw prediction into the standardized target column
fn feedback_scale(meta: &ForecastMeta, target_index: usize) -> Result<Option<(f64, f64)>> {
    let params = match (&meta.target_scaling, &meta.scaler) {
        (TargetScaling::Raw, Some(params)) => params,
        _ => return Ok(None),
    };
    match (
        params.feature_means.get(target_index),
        params.feature_stds.get(target_index),
    ) {
        (Some(&mean), Some(&std)) => Ok(Some((mean, std))),
        _ => Err(RolloutError::ConfigurationError(format!(
            "scaler: no parameters for target feature {}",
            target_index
        ))),
    }
}

fn collect<F: Forecaster + ?Sized>(run: Rollout<'_, F>) -> Result<Vec<f64>> {
    let steps = run.steps;
    info!(steps, window = run.window.len(), "starting rollout");
    let predictions = run.collect::<Result<Vec<f64>>>()?;
    info!(steps = predictions.len(), "rollout complete");
    Ok(predictions)
}
