//! # Window Prep
//!
//! Turns a timestamped measurement table into supervised training tensors
//! for sequence forecasters.
//!
//! ## Features
//!
//! - CSV / DataFrame input with optional chronological sorting
//! - Chronological train/validation/test split by row count (never shuffled)
//! - Per-feature standardization fitted on the training rows only
//! - Sliding `(window, horizon)` samples that never cross a partition boundary
//! - `.npy` tensors and a `meta.json` descriptor for downstream tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use window_prep::{prepare, DataLoader, PrepareConfig};
//!
//! let table = DataLoader::from_csv("weather_hourly.csv")?;
//! let config = PrepareConfig::new(vec!["temp", "rh", "wind"], "temp")
//!     .with_datetime_column("timestamp")
//!     .with_window(48)
//!     .with_horizon(1)
//!     .with_split_ratios(0.7, 0.15);
//!
//! let dataset = prepare(&table, &config)?;
//! println!("train samples: {}", dataset.train.len());
//!
//! window_prep::store::save_dataset("TS_npy", &dataset)?;
//! # Ok::<(), window_prep::PrepError>(())
//! ```

pub mod config;
pub mod error;
pub mod meta;
pub mod prepare;
pub mod scaler;
pub mod split;
pub mod store;
pub mod table;
pub mod window;

// Re-export commonly used types
pub use crate::config::{PrepareConfig, TargetScaling};
pub use crate::error::{PrepError, Result};
pub use crate::meta::{ForecastMeta, ScalerParams};
pub use crate::prepare::{prepare, prepare_with, PreparedDataset};
pub use crate::scaler::{FeatureScaler, TargetScaler};
pub use crate::split::{split_bounds, DatasetSplit};
pub use crate::table::{DataLoader, TimeSeriesTable};
pub use crate::window::{make_windows, sample_count, WindowedSamples};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
