//! # Autoregress
//!
//! Multi-step forecasting with a single-step model: every prediction is fed
//! back into the input window before the next step.
//!
//! ## Features
//!
//! - `Forecaster` capability for any single-step model (closures included)
//! - Rolling window state machine and a lazy `Rollout` iterator
//! - Whole-rollout failure on model errors or non-finite predictions
//! - Cooperative cancellation between steps
//! - Timestamped forecast documents (JSON / CSV)
//! - A least-squares baseline model and test-set accuracy metrics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use autoregress::{rollout_with_meta, ForecastModel, LaggedMeanRegression};
//! use window_prep::store::load_dataset;
//!
//! let data = load_dataset("TS_npy")?;
//! let target_idx = data.meta.target_feature_index()?;
//!
//! let model = LaggedMeanRegression::new(3, target_idx)?
//!     .train(data.train.inputs.view(), data.train.targets.view())?;
//!
//! let window = data.test.last_input().expect("test partition has samples");
//! let predictions = rollout_with_meta(window, &data.meta, 40, &model)?;
//! assert_eq!(predictions.len(), 40);
//! # Ok::<(), autoregress::RolloutError>(())
//! ```

pub mod config;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod models;
pub mod rolling;
pub mod rollout;

// Re-export commonly used types
pub use crate::config::RolloutConfig;
pub use crate::error::{Result, RolloutError};
pub use crate::forecast::{forecast, future_timestamps, parse_interval, Forecast};
pub use crate::metrics::{evaluate, forecast_accuracy, ForecastAccuracy};
pub use crate::models::{ForecastModel, Forecaster, LaggedMeanRegression, TrainedLaggedMean};
pub use crate::rolling::RollingWindow;
pub use crate::rollout::{
    rollout, rollout_with_cancellation, rollout_with_meta, CancellationFlag, Rollout,
    DEFAULT_STEPS,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
