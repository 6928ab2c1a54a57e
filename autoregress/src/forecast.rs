//! Forecast sequences, their timestamps and output documents

use crate::config::RolloutConfig;
use crate::error::{Result, RolloutError};
use crate::models::Forecaster;
use crate::rollout::rollout_with_meta;
use chrono::{DateTime, Duration, Utc};
use ndarray::ArrayView2;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use window_prep::{ForecastMeta, TargetScaler};

/// Ordered multi-step forecast, step 1 first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Number of steps forecasted
    horizon: usize,
    /// Forecasted values
    #[serde(rename = "pred")]
    values: Vec<f64>,
    /// Timestamps of each step (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamps: Option<Vec<DateTime<Utc>>>,
}

/// Parse a step interval such as `"3h"`, `"30min"`, `"1d"`, `"hourly"`
pub fn parse_interval(frequency: &str) -> Result<Duration> {
    let frequency = frequency.trim().to_lowercase();
    let named = match frequency.as_str() {
        "daily" => Some(Duration::days(1)),
        "weekly" => Some(Duration::weeks(1)),
        "hourly" => Some(Duration::hours(1)),
        "minute" => Some(Duration::minutes(1)),
        _ => None,
    };
    if let Some(duration) = named {
        return Ok(duration);
    }

    let split = frequency
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(frequency.len());
    let (count, unit) = frequency.split_at(split);
    let count: i64 = if count.is_empty() {
        1
    } else {
        count.parse().map_err(|_| {
            RolloutError::ConfigurationError(format!("interval: unsupported frequency '{}'", frequency))
        })?
    };
    if count <= 0 {
        return Err(RolloutError::ConfigurationError(format!(
            "interval: frequency '{}' must be positive",
            frequency
        )));
    }

    let duration = match unit {
        "min" | "m" => Duration::try_minutes(count),
        "h" => Duration::try_hours(count),
        "d" => Duration::try_days(count),
        "w" => Duration::try_weeks(count),
        _ => {
            return Err(RolloutError::ConfigurationError(format!(
                "interval: unsupported frequency '{}'",
                frequency
            )))
        }
    };
    duration.ok_or_else(|| {
        RolloutError::ConfigurationError(format!(
            "interval: frequency '{}' is out of range",
            frequency
        ))
    })
}

/// Timestamps for `steps` future points spaced `interval` apart after `last`
pub fn future_timestamps(
    last_timestamp: DateTime<Utc>,
    steps: usize,
    interval: Duration,
) -> Result<Vec<DateTime<Utc>>> {
    let mut timestamps = Vec::with_capacity(steps);
    let mut current = last_timestamp;
    for step in 1..=steps {
        current = current.checked_add_signed(interval).ok_or_else(|| {
            RolloutError::ConfigurationError(format!(
                "interval: timestamp of step {} is out of range",
                step
            ))
        })?;
        timestamps.push(current);
    }
    Ok(timestamps)
}

/// Roll `forecaster` forward from `initial_window` and package the result in
/// target units, stamped after `last_timestamp` when an interval is configured.
///
/// `initial_window` should end at the last observed row
/// ([`window_prep::PreparedDataset::latest_input`]) so the first value is the
/// step after `last_timestamp`.
pub fn forecast<F: Forecaster + ?Sized>(
    initial_window: ArrayView2<'_, f64>,
    meta: &ForecastMeta,
    config: &RolloutConfig,
    forecaster: &F,
    last_timestamp: Option<DateTime<Utc>>,
) -> Result<Forecast> {
    config.validate()?;
    let values = rollout_with_meta(initial_window, meta, config.steps, forecaster)?;
    let forecast = Forecast::new(values).in_target_units(meta);

    match (last_timestamp, config.interval()?) {
        (Some(last), Some(interval)) => forecast.with_timestamps(last, interval),
        _ => Ok(forecast),
    }
}

impl Forecast {
    /// Wrap rollout output
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            horizon: values.len(),
            values,
            timestamps: None,
        }
    }

    /// Attach timestamps following `last_timestamp` at a fixed interval
    pub fn with_timestamps(
        mut self,
        last_timestamp: DateTime<Utc>,
        interval: Duration,
    ) -> Result<Self> {
        self.timestamps = Some(future_timestamps(last_timestamp, self.horizon, interval)?);
        Ok(self)
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of steps forecasted
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Get the timestamps, if available
    pub fn timestamps(&self) -> Option<&[DateTime<Utc>]> {
        self.timestamps.as_deref()
    }

    /// Map standardized predictions back to target units
    pub fn inverse_scaled(&self, scaler: &TargetScaler) -> Self {
        Self {
            horizon: self.horizon,
            values: scaler.inverse_transform(&self.values),
            timestamps: self.timestamps.clone(),
        }
    }

    /// Values in target units according to how `meta` scaled the targets
    pub fn in_target_units(&self, meta: &ForecastMeta) -> Self {
        match meta.target_scaler() {
            Some(scaler) => self.inverse_scaled(&scaler),
            None => self.clone(),
        }
    }

    /// `{"horizon": n, "pred": [...]}` plus `"timestamps"` when present
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Write the JSON document to `path`
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    /// Write `step,timestamp,pred` rows to `path`
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(["step", "timestamp", "pred"])?;
        for (i, value) in self.values.iter().enumerate() {
            let timestamp = self
                .timestamps
                .as_ref()
                .map(|ts| ts[i].to_rfc3339())
                .unwrap_or_default();
            writer.write_record([(i + 1).to_string(), timestamp, value.to_string()])?;
        }
        writer.flush()?;
        Ok(())
    }
}
