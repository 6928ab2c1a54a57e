//! Train-only standardization of feature and target columns
//!
//! Both scalers use the population standard deviation (divide by `n`).
//! A deviation below [`MIN_STD`] is replaced by `1.0`, so constant columns
//! map to zero instead of dividing by zero.

use crate::error::{PrepError, Result};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Deviations below this threshold are treated as zero
pub const MIN_STD: f64 = 1e-12;

/// Per-feature (mean, std) pairs fitted on the training partition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

/// (mean, std) for a single target column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetScaler {
    pub mean: f64,
    pub std: f64,
}

fn column_stats(values: ArrayView1<f64>) -> (f64, f64) {
    let mean = values.iter().mean();
    let std = values.iter().population_std_dev();
    let std = if std.is_finite() && std >= MIN_STD {
        std
    } else {
        1.0
    };
    (mean, std)
}

impl FeatureScaler {
    /// Fit on a `(rows, features)` matrix. Callers pass the training rows only.
    pub fn fit(features: ArrayView2<f64>) -> Result<Self> {
        if features.nrows() == 0 {
            return Err(PrepError::InsufficientDataError(
                "cannot fit scaler on an empty training partition".to_string(),
            ));
        }
        if features.ncols() == 0 {
            return Err(PrepError::ConfigurationError(
                "feature_cols: scaler needs at least one feature".to_string(),
            ));
        }

        let (means, stds) = features
            .axis_iter(Axis(1))
            .map(column_stats)
            .unzip();

        Ok(Self { means, stds })
    }

    /// Rebuild a scaler from stored parameters
    pub fn from_parts(means: Vec<f64>, stds: Vec<f64>) -> Result<Self> {
        if means.len() != stds.len() || means.is_empty() {
            return Err(PrepError::DataError(format!(
                "Scaler parameters have mismatched lengths ({} means, {} stds)",
                means.len(),
                stds.len()
            )));
        }
        Ok(Self { means, stds })
    }

    /// Per-feature means
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Per-feature standard deviations
    pub fn stds(&self) -> &[f64] {
        &self.stds
    }

    /// Number of features
    pub fn num_features(&self) -> usize {
        self.means.len()
    }

    fn check_width(&self, features: &ArrayView2<f64>) -> Result<()> {
        if features.ncols() != self.num_features() {
            return Err(PrepError::DataError(format!(
                "Expected {} feature columns, got {}",
                self.num_features(),
                features.ncols()
            )));
        }
        Ok(())
    }

    /// Standardize with the fitted parameters
    pub fn transform(&self, features: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_width(&features)?;
        let mut out = features.to_owned();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (mean, std) = (self.means[j], self.stds[j]);
            column.mapv_inplace(|x| (x - mean) / std);
        }
        Ok(out)
    }

    /// Map standardized values back to the original scale
    pub fn inverse_transform(&self, scaled: ArrayView2<f64>) -> Result<Array2<f64>> {
        self.check_width(&scaled)?;
        let mut out = scaled.to_owned();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let (mean, std) = (self.means[j], self.stds[j]);
            column.mapv_inplace(|x| x * std + mean);
        }
        Ok(out)
    }
}

impl TargetScaler {
    /// Fit on the training rows of the target column
    pub fn fit(values: ArrayView1<f64>) -> Result<Self> {
        if values.is_empty() {
            return Err(PrepError::InsufficientDataError(
                "cannot fit target scaler on an empty training partition".to_string(),
            ));
        }
        let (mean, std) = column_stats(values);
        Ok(Self { mean, std })
    }

    pub fn transform(&self, values: ArrayView1<f64>) -> Array1<f64> {
        values.mapv(|x| (x - self.mean) / self.std)
    }

    pub fn inverse(&self, value: f64) -> f64 {
        value * self.std + self.mean
    }

    pub fn inverse_transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.inverse(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_population_std() {
        let train = array![[1.0, 10.0], [2.0, 10.0], [3.0, 10.0], [4.0, 10.0]];
        let scaler = FeatureScaler::fit(train.view()).unwrap();

        assert_abs_diff_eq!(scaler.means()[0], 2.5, epsilon = 1e-12);
        // population variance of 1..4 is 1.25
        assert_abs_diff_eq!(scaler.stds()[0], 1.25_f64.sqrt(), epsilon = 1e-12);
        // constant column falls back to unit scale
        assert_abs_diff_eq!(scaler.stds()[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_round_trip() {
        let train = array![[1.5, -3.0], [2.5, 4.0], [7.0, 0.5]];
        let other = array![[100.0, -50.0], [0.0, 0.0]];
        let scaler = FeatureScaler::fit(train.view()).unwrap();

        let scaled = scaler.transform(other.view()).unwrap();
        let restored = scaler.inverse_transform(scaled.view()).unwrap();
        for (a, b) in restored.iter().zip(other.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_transform_rejects_wrong_width() {
        let scaler = FeatureScaler::fit(array![[1.0, 2.0]].view()).unwrap();
        assert!(matches!(
            scaler.transform(array![[1.0]].view()),
            Err(PrepError::DataError(_))
        ));
    }

    #[test]
    fn test_empty_fit_is_insufficient_data() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(matches!(
            FeatureScaler::fit(empty.view()),
            Err(PrepError::InsufficientDataError(_))
        ));
    }

    #[test]
    fn test_target_scaler_inverse() {
        let scaler = TargetScaler::fit(array![10.0, 20.0, 30.0].view()).unwrap();
        let scaled = scaler.transform(array![25.0].view());
        assert_abs_diff_eq!(scaler.inverse(scaled[0]), 25.0, epsilon = 1e-12);
        assert_eq!(scaler.inverse_transform(&[0.0]), vec![20.0]);
    }
}
