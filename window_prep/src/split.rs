//! Chronological train/validation/test partitioning

use std::ops::Range;

/// Three contiguous, non-overlapping row ranges in time order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSplit {
    pub train: Range<usize>,
    pub val: Range<usize>,
    pub test: Range<usize>,
}

/// Split boundaries `(train_end, val_end)` for `n` rows.
///
/// Ratios apply to the row count, not elapsed time:
/// `train_end = floor(n * r1)`, `val_end = floor(n * (r1 + r2))`.
pub fn split_bounds(n: usize, ratios: (f64, f64)) -> (usize, usize) {
    let train_end = ((n as f64 * ratios.0).floor() as usize).min(n);
    let val_end = ((n as f64 * (ratios.0 + ratios.1)).floor() as usize).clamp(train_end, n);
    (train_end, val_end)
}

impl DatasetSplit {
    /// Partition `n` rows using the train and validation ratios
    pub fn new(n: usize, ratios: (f64, f64)) -> Self {
        let (train_end, val_end) = split_bounds(n, ratios);
        Self {
            train: 0..train_end,
            val: train_end..val_end,
            test: val_end..n,
        }
    }
}
