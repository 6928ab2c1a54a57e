//! Accuracy of one-step predictions on held-out windows

use crate::error::{Result, RolloutError};
use crate::models::Forecaster;
use ndarray::{s, ArrayView2, ArrayView3};

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error over non-zero actuals
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
    /// Number of compared points
    pub samples: usize,
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(RolloutError::ConfigurationError(format!(
            "forecast ({}) and actual ({}) values must have the same non-zero length",
            forecast.len(),
            actual.len()
        )));
    }

    let n = forecast.len() as f64;
    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    let nonzero = actual.iter().filter(|&&a| a != 0.0).count();
    let mape = if nonzero == 0 {
        0.0
    } else {
        actual
            .iter()
            .zip(errors.iter())
            .filter(|(&a, _)| a != 0.0)
            .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
            .sum::<f64>()
            / nonzero as f64
    };

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
        samples: forecast.len(),
    })
}

/// Predict every window in `inputs` and compare with the first step of
/// `targets`
pub fn evaluate<F: Forecaster + ?Sized>(
    forecaster: &F,
    inputs: ArrayView3<'_, f64>,
    targets: ArrayView2<'_, f64>,
) -> Result<ForecastAccuracy> {
    let n = inputs.dim().0;
    if n == 0 || targets.nrows() != n || targets.ncols() == 0 {
        return Err(RolloutError::ConfigurationError(format!(
            "evaluation needs matching non-empty inputs and targets, got {} windows and {:?} targets",
            n,
            targets.dim()
        )));
    }

    let mut predictions = Vec::with_capacity(n);
    for i in 0..n {
        let prediction = forecaster
            .predict(inputs.slice(s![i..i + 1, .., ..]))
            .map_err(|e| RolloutError::PredictionFailure {
                step: i + 1,
                reason: e.to_string(),
            })?;
        if !prediction.is_finite() {
            return Err(RolloutError::PredictionFailure {
                step: i + 1,
                reason: format!("non-finite prediction {} for sample {}", prediction, i),
            });
        }
        predictions.push(prediction);
    }

    let actual = targets.column(0).to_vec();
    let accuracy = forecast_accuracy(&predictions, &actual)?;
    tracing::info!(
        samples = n,
        mae = accuracy.mae,
        rmse = accuracy.rmse,
        "evaluated forecaster"
    );
    Ok(accuracy)
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy ({} samples):", self.samples)?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_forecast_accuracy() {
        let accuracy = forecast_accuracy(&[105.0, 106.0, 107.0], &[106.0, 107.0, 108.0]).unwrap();
        assert_abs_diff_eq!(accuracy.mae, 1.0);
        assert_abs_diff_eq!(accuracy.rmse, 1.0);
        assert_eq!(accuracy.samples, 3);

        assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
        assert!(forecast_accuracy(&[], &[]).is_err());
    }

    #[test]
    fn test_evaluate_uses_first_target_step() {
        let inputs = Array3::from_shape_fn((4, 2, 1), |(i, t, _)| (i + t) as f64);
        let targets = Array2::from_shape_fn((4, 2), |(i, h)| (i + 2 + h) as f64);
        let last_plus_one =
            |batch: ArrayView3<f64>| -> Result<f64> { Ok(batch[[0, 1, 0]] + 1.0) };

        let accuracy = evaluate(&last_plus_one, inputs.view(), targets.view()).unwrap();
        assert_abs_diff_eq!(accuracy.mae, 0.0);
        assert!(format!("{}", accuracy).contains("4 samples"));
    }

    #[test]
    fn test_evaluate_rejects_empty() {
        let inputs = Array3::<f64>::zeros((0, 2, 1));
        let targets = Array2::<f64>::zeros((0, 1));
        let zero = |_: ArrayView3<f64>| -> Result<f64> { Ok(0.0) };
        assert!(matches!(
            evaluate(&zero, inputs.view(), targets.view()),
            Err(RolloutError::ConfigurationError(_))
        ));
    }
}
