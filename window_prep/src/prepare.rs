//! End-to-end preparation: sort, split, fit, transform, window

use crate::config::{PrepareConfig, TargetScaling};
use crate::error::{PrepError, Result};
use crate::meta::{ForecastMeta, ScalerParams};
use crate::scaler::{FeatureScaler, TargetScaler};
use crate::split::DatasetSplit;
use crate::table::TimeSeriesTable;
use crate::window::{make_windows, WindowedSamples};
use chrono::{DateTime, Utc};
use ndarray::{s, Array1, Array2, ArrayView2};
use std::ops::Range;
use tracing::{debug, info, warn};

/// Windowed train/validation/test partitions plus their metadata
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub train: WindowedSamples,
    pub val: WindowedSamples,
    pub test: WindowedSamples,
    pub meta: ForecastMeta,
    /// Scaler fitted on the training rows
    pub feature_scaler: FeatureScaler,
    /// Target statistics from the training rows
    pub target_scaler: TargetScaler,
    /// Normalized final `W` rows of the whole table, if it has that many
    pub latest_window: Option<Array2<f64>>,
    /// Timestamp of the final row, when a datetime column was used
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl PreparedDataset {
    /// Normalized window ending at the final row of the table. Rollouts that
    /// forecast past `last_timestamp` start here.
    pub fn latest_input(&self) -> Option<ArrayView2<'_, f64>> {
        self.latest_window.as_ref().map(|w| w.view())
    }

    /// Input window of the last test sample, falling back to validation and
    /// then training when later partitions are empty
    pub fn last_window(&self) -> Option<ArrayView2<'_, f64>> {
        self.test
            .last_input()
            .or_else(|| self.val.last_input())
            .or_else(|| self.train.last_input())
    }

    /// Total sample count over all partitions
    pub fn total_samples(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }
}

/// Positional form of [`prepare`] using default target scaling and no
/// datetime column
pub fn prepare_with(
    table: &TimeSeriesTable,
    feature_cols: &[&str],
    target_col: &str,
    window: usize,
    horizon: usize,
    split_ratios: (f64, f64),
) -> Result<PreparedDataset> {
    let config = PrepareConfig::new(feature_cols.to_vec(), target_col)
        .with_window(window)
        .with_horizon(horizon)
        .with_split_ratios(split_ratios.0, split_ratios.1);
    prepare(table, &config)
}

fn check_columns(table: &TimeSeriesTable, config: &PrepareConfig) -> Result<()> {
    for name in &config.feature_cols {
        if !table.has_column(name) {
            return Err(PrepError::ConfigurationError(format!(
                "feature_cols: column '{}' not found",
                name
            )));
        }
    }
    if !table.has_column(&config.target_col) {
        return Err(PrepError::ConfigurationError(format!(
            "target_col: column '{}' not found",
            config.target_col
        )));
    }
    Ok(())
}

/// Turn a table into windowed train/validation/test tensors.
///
/// The scaler only ever sees the training rows. It is fitted before any
/// partition is transformed; the three partitions are then windowed in
/// parallel, each over its own rows only.
pub fn prepare(table: &TimeSeriesTable, config: &PrepareConfig) -> Result<PreparedDataset> {
    config.validate()?;
    check_columns(table, config)?;

    let table = match &config.datetime_col {
        Some(name) => table.clone().with_datetime_column(name)?,
        None => table.clone(),
    };

    if table.is_empty() {
        return Err(PrepError::EmptyInputError("input table has no rows".to_string()));
    }

    let order = table.chronological_order()?;
    let features = table.feature_matrix(&config.feature_cols, &order)?;
    let target = table.column_array(&config.target_col, &order)?;
    let last_timestamp = table.last_timestamp()?;

    let n = order.len();
    let split = DatasetSplit::new(n, config.split_ratios);
    info!(
        rows = n,
        train = split.train.len(),
        val = split.val.len(),
        test = split.test.len(),
        "split table"
    );

    if split.train.is_empty() {
        return Err(PrepError::InsufficientDataError(format!(
            "training partition is empty for {} rows at ratio {}",
            n, config.split_ratios.0
        )));
    }

    let feature_scaler = FeatureScaler::fit(features.slice(s![split.train.clone(), ..]))?;
    let target_scaler = TargetScaler::fit(target.slice(s![split.train.clone()]))?;
    debug!(
        means = ?feature_scaler.means(),
        stds = ?feature_scaler.stds(),
        "fitted feature scaler"
    );

    let partition_target = |range: Range<usize>| -> Array1<f64> {
        let raw = target.slice(s![range]);
        match config.target_scaling {
            TargetScaling::Raw => raw.to_owned(),
            TargetScaling::Standardized => target_scaler.transform(raw),
        }
    };

    let build = |range: Range<usize>| -> Result<WindowedSamples> {
        let scaled = feature_scaler.transform(features.slice(s![range.clone(), ..]))?;
        let targets = partition_target(range);
        Ok(make_windows(
            scaled.view(),
            targets.view(),
            config.window,
            config.horizon,
        ))
    };

    let (train, (val, test)) = rayon::join(
        || build(split.train.clone()),
        || {
            rayon::join(
                || build(split.val.clone()),
                || build(split.test.clone()),
            )
        },
    );
    let (train, val, test) = (train?, val?, test?);

    for (name, samples) in [("train", &train), ("val", &val), ("test", &test)] {
        if samples.is_empty() {
            warn!(
                partition = name,
                window = config.window,
                horizon = config.horizon,
                "partition too short for one sample"
            );
        }
    }

    if train.is_empty() && val.is_empty() && test.is_empty() {
        return Err(PrepError::InsufficientDataError(format!(
            "{} rows yield no samples for window {} and horizon {}",
            n, config.window, config.horizon
        )));
    }

    let latest_window = if n >= config.window {
        Some(feature_scaler.transform(features.slice(s![n - config.window.., ..]))?)
    } else {
        None
    };

    let meta = ForecastMeta {
        window: config.window,
        horizon: config.horizon,
        num_features: config.feature_cols.len(),
        feature_cols: config.feature_cols.clone(),
        target_col: config.target_col.clone(),
        split_ratio: [
            config.split_ratios.0,
            config.split_ratios.1,
            config.test_ratio(),
        ],
        target_scaling: config.target_scaling,
        scaler: Some(ScalerParams {
            feature_means: feature_scaler.means().to_vec(),
            feature_stds: feature_scaler.stds().to_vec(),
            target_mean: target_scaler.mean,
            target_std: target_scaler.std,
        }),
    };

    info!(
        train = train.len(),
        val = val.len(),
        test = test.len(),
        window = config.window,
        horizon = config.horizon,
        features = meta.num_features,
        "prepared windowed dataset"
    );

    Ok(PreparedDataset {
        train,
        val,
        test,
        meta,
        feature_scaler,
        target_scaler,
        latest_window,
        last_timestamp,
    })
}
