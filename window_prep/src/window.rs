//! Sliding-window construction of supervised samples

use ndarray::{s, Array2, Array3, ArrayView1, ArrayView2};

/// Number of samples a partition of `n` rows yields: `max(0, n - W - H + 1)`
pub fn sample_count(n: usize, window: usize, horizon: usize) -> usize {
    (n + 1).saturating_sub(window + horizon)
}

/// Inputs `(n, W, F)` and targets `(n, H)` of one partition
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedSamples {
    pub inputs: Array3<f64>,
    pub targets: Array2<f64>,
}

impl WindowedSamples {
    /// Zero samples with the intended window shape
    pub fn empty(window: usize, num_features: usize, horizon: usize) -> Self {
        Self {
            inputs: Array3::zeros((0, window, num_features)),
            targets: Array2::zeros((0, horizon)),
        }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.inputs.shape()[0]
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Window length `W`
    pub fn window(&self) -> usize {
        self.inputs.shape()[1]
    }

    /// Feature count `F`
    pub fn num_features(&self) -> usize {
        self.inputs.shape()[2]
    }

    /// Horizon `H`
    pub fn horizon(&self) -> usize {
        self.targets.ncols()
    }

    /// Input window of sample `i`
    pub fn input(&self, i: usize) -> ArrayView2<'_, f64> {
        self.inputs.slice(s![i, .., ..])
    }

    /// Target sequence of sample `i`
    pub fn target(&self, i: usize) -> ArrayView1<'_, f64> {
        self.targets.row(i)
    }

    /// The most recent input window, if any
    pub fn last_input(&self) -> Option<ArrayView2<'_, f64>> {
        self.len().checked_sub(1).map(|i| self.input(i))
    }
}

/// Slide a start index `i` by one across the rows, pairing
/// `features[i..i+W]` with `target[i+W..i+W+H]`.
///
/// Targets are always 2-D; a horizon of 1 gives `(n, 1)`.
pub fn make_windows(
    features: ArrayView2<f64>,
    target: ArrayView1<f64>,
    window: usize,
    horizon: usize,
) -> WindowedSamples {
    debug_assert_eq!(features.nrows(), target.len());
    let num_features = features.ncols();
    let count = sample_count(features.nrows(), window, horizon);
    if count == 0 {
        return WindowedSamples::empty(window, num_features, horizon);
    }

    let mut inputs = Array3::<f64>::zeros((count, window, num_features));
    let mut targets = Array2::<f64>::zeros((count, horizon));
    for i in 0..count {
        inputs
            .slice_mut(s![i, .., ..])
            .assign(&features.slice(s![i..i + window, ..]));
        targets
            .row_mut(i)
            .assign(&target.slice(s![i + window..i + window + horizon]));
    }

    WindowedSamples { inputs, targets }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};
    use rstest::rstest;

    fn ramp(n: usize) -> (Array2<f64>, Array1<f64>) {
        let features = Array2::from_shape_fn((n, 2), |(i, j)| (i * 10 + j) as f64);
        let target = Array1::from_shape_fn(n, |i| i as f64);
        (features, target)
    }

    #[rstest]
    #[case(12, 10, 3, 0)]
    #[case(13, 10, 3, 1)]
    #[case(700, 48, 1, 652)]
    #[case(150, 48, 1, 102)]
    #[case(0, 1, 1, 0)]
    #[case(5, 1, 1, 4)]
    fn test_sample_count(
        #[case] n: usize,
        #[case] window: usize,
        #[case] horizon: usize,
        #[case] expected: usize,
    ) {
        assert_eq!(sample_count(n, window, horizon), expected);
        let (features, target) = ramp(n);
        let samples = make_windows(features.view(), target.view(), window, horizon);
        assert_eq!(samples.len(), expected);
        assert_eq!(samples.window(), window);
        assert_eq!(samples.horizon(), horizon);
    }

    #[test]
    fn test_zero_gap_between_window_and_target() {
        let (features, target) = ramp(20);
        let samples = make_windows(features.view(), target.view(), 4, 3);

        for i in 0..samples.len() {
            let input = samples.input(i);
            // column 0 encodes the row index * 10
            let last_row = input[[3, 0]] / 10.0;
            assert_eq!(input[[0, 0]] / 10.0, i as f64);
            assert_eq!(samples.target(i)[0], last_row + 1.0);
            assert_eq!(samples.target(i).to_vec(), vec![last_row + 1.0, last_row + 2.0, last_row + 3.0]);
        }
    }

    #[test]
    fn test_empty_keeps_intended_shape() {
        let (features, target) = ramp(3);
        let samples = make_windows(features.view(), target.view(), 5, 2);
        assert!(samples.is_empty());
        assert_eq!(samples.inputs.shape(), &[0, 5, 2]);
        assert_eq!(samples.targets.shape(), &[0, 2]);
        assert!(samples.last_input().is_none());
    }
}
