//! # Weathercast
//!
//! Leakage-free window preparation and autoregressive forecasting for
//! weather time series.
//!
//! ## Example
//!
//! ```
//! use weathercast::prelude::*;
//!
//! let temp: Vec<f64> = (0..120).map(|i| 10.0 + (i as f64 / 4.0).sin()).collect();
//! let table = TimeSeriesTable::from_columns(&[("temp", temp)]).unwrap();
//! let config = PrepareConfig::new(vec!["temp"], "temp").with_window(8);
//!
//! let (forecast, accuracy) =
//!     weathercast::baseline_forecast(&table, &config, &RolloutConfig::new(4)).unwrap();
//! assert_eq!(forecast.horizon(), 4);
//! assert!(accuracy.is_some());
//! ```

pub use autoregress;
pub use window_prep;

/// Commonly used types from both crates
pub mod prelude {
    pub use autoregress::{
        evaluate, forecast, rollout, rollout_with_meta, CancellationFlag, Forecast,
        ForecastAccuracy, ForecastModel, Forecaster, LaggedMeanRegression, RolloutConfig,
        RolloutError,
    };
    pub use window_prep::{
        prepare, DataLoader, ForecastMeta, PrepError, PrepareConfig, PreparedDataset,
        TargetScaling, TimeSeriesTable,
    };
}

use autoregress::{evaluate, forecast, Forecast, ForecastAccuracy, ForecastModel};
use autoregress::{LaggedMeanRegression, Result, RolloutConfig};
use window_prep::{prepare, PrepareConfig, TimeSeriesTable};

/// Prepare `table`, fit the lag-1 baseline on the training windows and roll it
/// forward from the window ending at the table's final row.
///
/// Accuracy on the test partition is returned when it has samples.
pub fn baseline_forecast(
    table: &TimeSeriesTable,
    prepare_config: &PrepareConfig,
    rollout_config: &RolloutConfig,
) -> Result<(Forecast, Option<ForecastAccuracy>)> {
    let dataset = prepare(table, prepare_config)?;
    let target_idx = dataset.meta.target_feature_index()?;
    let model = LaggedMeanRegression::new(1, target_idx)?
        .train(dataset.train.inputs.view(), dataset.train.targets.view())?;

    let accuracy = if dataset.test.is_empty() {
        None
    } else {
        Some(evaluate(
            &model,
            dataset.test.inputs.view(),
            dataset.test.targets.view(),
        )?)
    };

    let window = dataset.latest_input().ok_or_else(|| {
        autoregress::RolloutError::ConfigurationError(
            "no window to start the rollout from".to_string(),
        )
    })?;
    let result = forecast(
        window,
        &dataset.meta,
        rollout_config,
        &model,
        dataset.last_timestamp,
    )?;

    Ok((result, accuracy))
}
