//! Whole-image composite scoring.

use std::sync::Arc;

use tracing::trace;

use super::Normalizer;
use crate::calibration::CalibrationStats;
use crate::domain::{thresholds, CompositeScore, GrayView, RawScores};
use crate::error::Result;
use crate::measures::measure_all;

/// Runs the four kernels on a view and combines them into one score.
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    normalizer: Normalizer,
}

impl CompositeScorer {
    /// Creates a scorer; `None` selects the hand-tuned normalization.
    #[must_use]
    pub const fn new(calibration: Option<Arc<CalibrationStats>>) -> Self {
        Self {
            normalizer: Normalizer::new(calibration),
        }
    }

    #[must_use]
    pub const fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.normalizer.is_calibrated()
    }

    /// Default blurry threshold for the active normalization.
    #[must_use]
    pub const fn default_threshold(&self) -> f64 {
        if self.is_calibrated() {
            thresholds::DEFAULT_CALIBRATED
        } else {
            thresholds::DEFAULT
        }
    }

    /// Measures and scores a view.
    ///
    /// # Errors
    ///
    /// Propagates kernel failures.
    pub fn score(&self, view: &GrayView<'_>) -> Result<CompositeScore> {
        let raw = measure_all(view)?;
        let score = self.score_raw(&raw);
        trace!(
            width = view.width(),
            height = view.height(),
            composite = score.composite,
            "scored view"
        );
        Ok(score)
    }

    /// Scores already-measured kernel output.
    #[must_use]
    pub fn score_raw(&self, raw: &RawScores) -> CompositeScore {
        CompositeScore::new(*raw, self.normalizer.normalize(raw))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::calibration::AlgorithmStats;
    use crate::domain::{is_blurry, GrayscaleImage};

    fn checkerboard(size: u32, cell: u32) -> GrayscaleImage {
        GrayscaleImage::from_fn(size, size, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                255
            } else {
                0
            }
        })
    }

    #[test]
    fn test_flat_gray_scores_zero_and_blurry() {
        let img = GrayscaleImage::from_fn(128, 128, |_, _| 128);
        let scorer = CompositeScorer::default();
        let score = scorer.score(&img.view()).unwrap();

        assert_eq!(score.composite, 0.0);
        assert_eq!(scorer.default_threshold(), 30.0);
        assert!(is_blurry(score.composite, scorer.default_threshold()));
    }

    #[test]
    fn test_checkerboard_scores_near_100_and_sharp() {
        let img = checkerboard(128, 8);
        let scorer = CompositeScorer::default();
        let score = scorer.score(&img.view()).unwrap();

        assert!(score.composite > 95.0, "composite={}", score.composite);
        assert!(!is_blurry(score.composite, scorer.default_threshold()));
    }

    #[test]
    fn test_calibrated_scorer_threshold() {
        let s = AlgorithmStats {
            p5: 1.0,
            p95: 2.0,
            median: 1.5,
            min: 0.5,
            max: 3.0,
        };
        let stats = CalibrationStats::new(s, s, s, s, 3, 3, false);
        let scorer = CompositeScorer::new(Some(Arc::new(stats)));
        assert!(scorer.is_calibrated());
        assert_eq!(scorer.default_threshold(), 25.0);
    }

    #[test]
    fn test_score_raw_uses_weights() {
        let scorer = CompositeScorer::default();
        let raw = RawScores {
            laplacian: 50.0,
            gradient: 0.0,
            tenengrad: 1e5,
            variance: 0.0,
        };
        let score = scorer.score_raw(&raw);
        // L = 100, T = 50
        assert!((score.composite - 50.0).abs() < 1e-9);
    }
}
