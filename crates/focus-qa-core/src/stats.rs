//! Small descriptive statistics shared by kernels, strategies and calibration.

/// Linear-interpolated percentile of an ascending-sorted slice.
///
/// `p` is on the 0-100 scale; the fractional rank is `p / 100 * (n - 1)`.
/// An empty slice yields 0.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted {
        [] => 0.0,
        [only] => *only,
        _ => {
            let last = sorted.len() - 1;
            let rank = (p / 100.0).clamp(0.0, 1.0) * last as f64;
            let lower = rank.floor() as usize;
            let upper = (lower + 1).min(last);
            let fraction = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
        }
    }
}

/// Sorts a copy of `values` ascending, treating NaN as equal.
#[must_use]
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Arithmetic mean; 0 for an empty slice.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (denominator `n`); 0 for an empty slice.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = mean(values);
    values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64
}

/// Streaming mean and population variance (Welford).
///
/// Lets kernels summarize a response field without materializing it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMoments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningMoments {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    /// Adds one observation.
    #[allow(clippy::cast_precision_loss)]
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Mean of the observations; 0 when empty.
    #[must_use]
    pub const fn mean(&self) -> f64 {
        self.mean
    }

    /// Population variance (denominator `n`); 0 when empty.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.m2 / self.count as f64).max(0.0)
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_empty_is_zero() {
        for p in [0.0, 5.0, 50.0, 100.0] {
            assert_eq!(percentile(&[], p), 0.0);
        }
    }

    #[test]
    fn test_percentile_endpoints() {
        let values = [1.0, 4.0, 9.0, 16.0, 25.0];
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 100.0), 25.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [10.0, 20.0, 30.0, 40.0];
        // rank = 0.5 * 3 = 1.5
        assert!((percentile(&values, 50.0) - 25.0).abs() < 1e-12);
        // rank = 0.75 * 3 = 2.25
        assert!((percentile(&values, 75.0) - 32.5).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_single_value() {
        assert_eq!(percentile(&[7.0], 95.0), 7.0);
    }

    #[test]
    fn test_sorted_copies_ascending() {
        let values = [3.0, -1.0, 2.0];
        assert_eq!(sorted(&values), vec![-1.0, 2.0, 3.0]);
        assert_eq!(values, [3.0, -1.0, 2.0]);
    }

    #[test]
    fn test_mean_and_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&values), 5.0);
        assert_eq!(population_variance(&values), 4.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(population_variance(&[]), 0.0);
    }

    #[test]
    fn test_running_moments_match_slice_statistics() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut moments = RunningMoments::new();
        for v in values {
            moments.push(v);
        }
        assert_eq!(moments.count(), 8);
        assert!((moments.mean() - 5.0).abs() < 1e-12);
        assert!((moments.variance() - 4.0).abs() < 1e-12);

        let empty = RunningMoments::new();
        assert_eq!(empty.mean(), 0.0);
        assert_eq!(empty.variance(), 0.0);
    }

    #[test]
    fn test_running_moments_large_offset() {
        // Large shared offset with tiny spread; naive sum-of-squares loses it.
        let values: Vec<f64> = (0..1000).map(|i| 1e9 + f64::from(i % 3)).collect();
        let mut moments = RunningMoments::new();
        for &v in &values {
            moments.push(v);
        }
        let expected = population_variance(&values);
        assert!((moments.variance() - expected).abs() < 1e-4, "{}", moments.variance());
    }
}
