//! Percentile statistics over a corpus of raw focus scores.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::CalibrationSample;
use crate::domain::RawScores;
use crate::error::{FocusError, Result};
use crate::measures::FocusMeasure;
use crate::stats::{percentile, sorted};

/// Format version written into every calibration record.
pub const CALIBRATION_VERSION: &str = "1.0";

/// Whether calibration data points are whole images or patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalibrationMode {
    /// One data point per image; pairs with the composite algorithm.
    #[default]
    FullImage,
    /// One data point per patch; pairs with the patch algorithm.
    Patch,
}

impl CalibrationMode {
    #[must_use]
    pub const fn is_patch(self) -> bool {
        matches!(self, Self::Patch)
    }

    #[must_use]
    pub const fn from_patch_flag(patch_mode: bool) -> Self {
        if patch_mode {
            Self::Patch
        } else {
            Self::FullImage
        }
    }
}

/// Distribution summary of one focus measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmStats {
    pub p5: f64,
    pub p95: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

impl AlgorithmStats {
    /// Summarizes an ascending-sorted, non-empty slice.
    fn from_sorted(values: &[f64]) -> Self {
        Self {
            p5: percentile(values, 5.0),
            p95: percentile(values, 95.0),
            median: percentile(values, 50.0),
            min: values.first().copied().unwrap_or(0.0),
            max: values.last().copied().unwrap_or(0.0),
        }
    }
}

/// Calibration dataset consumed by the scorers.
///
/// Serialized with the field names shared with external calibration tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationStats {
    pub laplacian: AlgorithmStats,
    pub gradient: AlgorithmStats,
    pub tenengrad: AlgorithmStats,
    pub variance: AlgorithmStats,
    /// Number of images in the corpus.
    pub sample_size: usize,
    /// Whether data points were patches.
    pub patch_mode: bool,
    /// Number of data points behind each distribution.
    pub total_samples: usize,
    pub version: String,
}

impl CalibrationStats {
    /// Assembles a record tagged with the current format version.
    #[must_use]
    pub fn new(
        laplacian: AlgorithmStats,
        gradient: AlgorithmStats,
        tenengrad: AlgorithmStats,
        variance: AlgorithmStats,
        sample_size: usize,
        total_samples: usize,
        patch_mode: bool,
    ) -> Self {
        Self {
            laplacian,
            gradient,
            tenengrad,
            variance,
            sample_size,
            patch_mode,
            total_samples,
            version: CALIBRATION_VERSION.to_string(),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> CalibrationMode {
        CalibrationMode::from_patch_flag(self.patch_mode)
    }

    /// Statistics of one focus measure.
    #[must_use]
    pub const fn measure(&self, measure: FocusMeasure) -> &AlgorithmStats {
        match measure {
            FocusMeasure::Laplacian => &self.laplacian,
            FocusMeasure::Gradient => &self.gradient,
            FocusMeasure::Tenengrad => &self.tenengrad,
            FocusMeasure::Variance => &self.variance,
        }
    }

    /// Checks that a loaded record is usable for normalization.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::Calibration`] for an unsupported version, an
    /// empty corpus, or non-finite / inverted percentile windows.
    pub fn validate(&self) -> Result<()> {
        let major = |v: &str| v.split('.').next().map(str::to_owned);
        if major(&self.version) != major(CALIBRATION_VERSION) {
            return Err(FocusError::calibration(format!(
                "unsupported calibration version '{}' (expected {CALIBRATION_VERSION})",
                self.version
            )));
        }
        if self.sample_size == 0 || self.total_samples == 0 {
            return Err(FocusError::calibration("calibration corpus is empty"));
        }
        for measure in FocusMeasure::ALL {
            let stats = self.measure(measure);
            let values = [stats.p5, stats.p95, stats.median, stats.min, stats.max];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(FocusError::calibration(format!(
                    "{measure:?} statistics contain non-finite values"
                )));
            }
            if stats.p95 < stats.p5 {
                return Err(FocusError::calibration(format!(
                    "{measure:?} p95 ({}) is below p5 ({})",
                    stats.p95, stats.p5
                )));
            }
        }
        Ok(())
    }
}

/// Computes per-measure percentiles over a calibration corpus.
///
/// In patch mode the data points of all images are flattened into one
/// distribution per measure. Samples of the wrong mode or with invalid raw
/// scores are skipped.
///
/// # Errors
///
/// Returns [`FocusError::Calibration`] if no usable sample remains.
pub fn compute_calibration(
    corpus: &[CalibrationSample],
    mode: CalibrationMode,
) -> Result<CalibrationStats> {
    let mut points: Vec<RawScores> = Vec::new();
    let mut images = 0usize;

    for (index, sample) in corpus.iter().enumerate() {
        let scores = match (sample, mode) {
            (CalibrationSample::Image(scores), CalibrationMode::FullImage) => {
                std::slice::from_ref(scores)
            }
            (CalibrationSample::Patches(scores), CalibrationMode::Patch) => scores.as_slice(),
            _ => {
                warn!(index, ?mode, "skipping calibration sample of the wrong mode");
                continue;
            }
        };
        if scores.is_empty() || !scores.iter().all(RawScores::is_valid) {
            warn!(index, "skipping calibration sample with invalid scores");
            continue;
        }
        points.extend_from_slice(scores);
        images += 1;
    }

    if points.is_empty() {
        return Err(FocusError::calibration(
            "no valid samples in calibration corpus",
        ));
    }

    let column = |measure: FocusMeasure| {
        let values: Vec<f64> = points.iter().map(|p| measure.select(p)).collect();
        let stats = AlgorithmStats::from_sorted(&sorted(&values));
        debug!(?measure, p5 = stats.p5, p95 = stats.p95, "calibrated measure");
        stats
    };

    let stats = CalibrationStats::new(
        column(FocusMeasure::Laplacian),
        column(FocusMeasure::Gradient),
        column(FocusMeasure::Tenengrad),
        column(FocusMeasure::Variance),
        images,
        points.len(),
        mode.is_patch(),
    );
    info!(
        images,
        data_points = stats.total_samples,
        patch_mode = stats.patch_mode,
        "computed calibration statistics"
    );
    Ok(stats)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
mod tests {
    use super::*;

    fn raw(v: f64) -> RawScores {
        RawScores {
            laplacian: v,
            gradient: v * 2.0,
            tenengrad: v * 1000.0,
            variance: v + 1.0,
        }
    }

    /// Textbook linear interpolation between closest ranks.
    fn reference_percentile(values: &[f64], p: f64) -> f64 {
        let mut v = values.to_vec();
        v.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let rank = p / 100.0 * (v.len() - 1) as f64;
        let lo = rank.floor();
        let hi = rank.ceil();
        v[lo as usize] + (v[hi as usize] - v[lo as usize]) * (rank - lo)
    }

    #[test]
    fn test_full_image_percentiles_match_reference() {
        let values: Vec<f64> = (0..101).map(|i| f64::from((i * 53) % 101)).collect();
        let corpus: Vec<_> = values.iter().map(|&v| CalibrationSample::Image(raw(v))).collect();

        let stats = compute_calibration(&corpus, CalibrationMode::FullImage).unwrap();

        assert_eq!(stats.sample_size, 101);
        assert_eq!(stats.total_samples, 101);
        assert!(!stats.patch_mode);
        assert_eq!(stats.version, CALIBRATION_VERSION);
        assert!((stats.laplacian.p5 - reference_percentile(&values, 5.0)).abs() < 1e-9);
        assert!((stats.laplacian.p95 - reference_percentile(&values, 95.0)).abs() < 1e-9);
        assert_eq!(stats.laplacian.median, 50.0);
        assert_eq!(stats.laplacian.min, 0.0);
        assert_eq!(stats.laplacian.max, 100.0);

        let tenengrads: Vec<f64> = values.iter().map(|v| v * 1000.0).collect();
        assert!((stats.tenengrad.p95 - reference_percentile(&tenengrads, 95.0)).abs() < 1e-6);
    }

    #[test]
    fn test_skewed_distribution() {
        let values: Vec<f64> = (1..=40).map(|i| f64::from(i).powi(3)).collect();
        let corpus: Vec<_> = values.iter().map(|&v| CalibrationSample::Image(raw(v))).collect();
        let stats = compute_calibration(&corpus, CalibrationMode::FullImage).unwrap();

        assert!((stats.gradient.p5 - reference_percentile(&values, 5.0) * 2.0).abs() < 1e-9);
        assert!((stats.variance.p95 - (reference_percentile(&values, 95.0) + 1.0)).abs() < 1e-9);
    }

    #[test]
    fn test_patch_mode_flattens_all_patches() {
        let corpus = vec![
            CalibrationSample::Patches((0..4).map(|i| raw(f64::from(i))).collect()),
            CalibrationSample::Patches((4..8).map(|i| raw(f64::from(i))).collect()),
        ];
        let stats = compute_calibration(&corpus, CalibrationMode::Patch).unwrap();

        assert_eq!(stats.sample_size, 2);
        assert_eq!(stats.total_samples, 8);
        assert!(stats.patch_mode);
        assert_eq!(stats.laplacian.min, 0.0);
        assert_eq!(stats.laplacian.max, 7.0);
        assert_eq!(stats.laplacian.median, 3.5);
    }

    #[test]
    fn test_empty_corpus_is_calibration_error() {
        let err = compute_calibration(&[], CalibrationMode::FullImage).unwrap_err();
        assert!(matches!(err, FocusError::Calibration(_)));
        assert!(compute_calibration(&[], CalibrationMode::Patch).is_err());
    }

    #[test]
    fn test_invalid_and_mismatched_samples_filtered() {
        let corpus = vec![
            CalibrationSample::Image(RawScores {
                laplacian: f64::NAN,
                ..raw(1.0)
            }),
            CalibrationSample::Patches(vec![raw(3.0)]),
            CalibrationSample::Patches(vec![]),
        ];
        let err = compute_calibration(&corpus, CalibrationMode::FullImage).unwrap_err();
        assert!(matches!(err, FocusError::Calibration(_)));

        let mut corpus = corpus;
        corpus.push(CalibrationSample::Image(raw(2.0)));
        let stats = compute_calibration(&corpus, CalibrationMode::FullImage).unwrap();
        assert_eq!(stats.sample_size, 1);
        assert_eq!(stats.laplacian.p5, 2.0);
        assert_eq!(stats.laplacian.p95, 2.0);
    }

    #[test]
    fn test_validate_rejects_bad_records() {
        let corpus: Vec<_> = (0..10).map(|i| CalibrationSample::Image(raw(f64::from(i)))).collect();
        let good = compute_calibration(&corpus, CalibrationMode::FullImage).unwrap();
        assert!(good.validate().is_ok());

        let mut wrong_version = good.clone();
        wrong_version.version = "2.0".into();
        assert!(wrong_version.validate().is_err());

        let mut inverted = good.clone();
        inverted.tenengrad.p95 = inverted.tenengrad.p5 - 1.0;
        assert!(inverted.validate().is_err());

        let mut empty = good;
        empty.total_samples = 0;
        assert!(empty.validate().is_err());
    }
}
