//! Rolling input window carried across autoregressive steps

use crate::error::{Result, RolloutError};
use ndarray::{s, Array2, ArrayView2, ArrayView3, Axis};

/// Private `(W, F)` window owned by one rollout.
///
/// The only transition is [`RollingWindow::advance`]: copy the last row,
/// overwrite the target column with the prediction, drop the oldest row and
/// append the new one. Every other feature is carried forward unchanged.
///
/// When the window holds standardized features but the forecaster predicts
/// raw target values, [`RollingWindow::with_feedback_scale`] maps each
/// prediction into the window's scale before it is written.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingWindow {
    state: Array2<f64>,
    target_index: usize,
    feedback_scale: Option<(f64, f64)>,
}

impl RollingWindow {
    /// Copy `initial` into a new window; the caller's array is never touched
    pub fn new(initial: ArrayView2<'_, f64>, target_index: usize) -> Result<Self> {
        let (rows, cols) = initial.dim();
        if rows == 0 || cols == 0 {
            return Err(RolloutError::ConfigurationError(format!(
                "initial_window: shape ({}, {}) has no rows or no features",
                rows, cols
            )));
        }
        if target_index >= cols {
            return Err(RolloutError::ConfigurationError(format!(
                "target_feature_index: {} out of range for {} features",
                target_index, cols
            )));
        }
        if initial.iter().any(|v| !v.is_finite()) {
            return Err(RolloutError::ConfigurationError(
                "initial_window: contains non-finite values".to_string(),
            ));
        }

        Ok(Self {
            state: initial.to_owned(),
            target_index,
            feedback_scale: None,
        })
    }

    /// Standardize fed-back predictions with the target column's `mean` and
    /// `std` before writing them into the window
    pub fn with_feedback_scale(mut self, mean: f64, std: f64) -> Result<Self> {
        if !(mean.is_finite() && std.is_finite() && std > 0.0) {
            return Err(RolloutError::ConfigurationError(format!(
                "feedback scale: invalid mean {} / std {}",
                mean, std
            )));
        }
        self.feedback_scale = Some((mean, std));
        Ok(self)
    }

    /// Current window
    pub fn window(&self) -> ArrayView2<'_, f64> {
        self.state.view()
    }

    /// Current window as a `(1, W, F)` batch
    pub fn as_batch(&self) -> ArrayView3<'_, f64> {
        self.state.view().insert_axis(Axis(0))
    }

    /// Window length
    pub fn len(&self) -> usize {
        self.state.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.state.nrows() == 0
    }

    /// Column that receives predictions
    pub fn target_index(&self) -> usize {
        self.target_index
    }

    /// Slide forward one step, feeding `prediction` into the target column
    pub fn advance(&mut self, prediction: f64) {
        let rows = self.state.nrows();
        let mut next_row = self.state.row(rows - 1).to_owned();
        next_row[self.target_index] = match self.feedback_scale {
            Some((mean, std)) => (prediction - mean) / std,
            None => prediction,
        };

        if rows > 1 {
            let shifted = self.state.slice(s![1.., ..]).to_owned();
            self.state.slice_mut(s![..rows - 1, ..]).assign(&shifted);
        }
        self.state.row_mut(rows - 1).assign(&next_row);
    }

    /// Consume the state, returning the final window
    pub fn into_inner(self) -> Array2<f64> {
        self.state
    }
}
