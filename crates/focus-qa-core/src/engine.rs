//! Per-image scoring entry point.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::calibration::{CalibrationMode, CalibrationStats};
use crate::domain::{
    is_blurry, Algorithm, ImageInfo, PerImageResult, ScoreDetails, ScoreOutcome, ScoredImage,
};
use crate::error::{FocusError, Result};
use crate::patch::{PatchAnalyzer, PatchGrid, DEFAULT_GRID_SIZE};
use crate::scoring::CompositeScorer;

/// Settings for a [`BlurEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Scoring algorithm and, for patch scoring, the strategy.
    pub algorithm: Algorithm,
    /// Decision threshold; `None` selects the algorithm default.
    pub threshold: Option<f64>,
    /// Patches per axis for patch scoring.
    pub grid_size: u32,
    /// Corpus statistics; `None` selects the hand-tuned normalization.
    pub calibration: Option<Arc<CalibrationStats>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            threshold: None,
            grid_size: DEFAULT_GRID_SIZE,
            calibration: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Scorer {
    Composite(CompositeScorer),
    Patch(PatchAnalyzer),
}

/// Scores images with a fixed algorithm, threshold and normalization.
#[derive(Debug, Clone)]
pub struct BlurEngine {
    algorithm: Algorithm,
    threshold: f64,
    calibrated: bool,
    scorer: Scorer,
}

impl BlurEngine {
    /// Validates `config` and builds the scorer it describes.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::Config`] for a threshold outside 0-100 or a
    /// zero grid size, and [`FocusError::Calibration`] when the calibration
    /// mode does not match the algorithm (patch statistics with composite
    /// scoring or whole-image statistics with patch scoring).
    pub fn new(config: EngineConfig) -> Result<Self> {
        let EngineConfig {
            algorithm,
            threshold,
            grid_size,
            calibration,
        } = config;

        if let Some(t) = threshold {
            if !(0.0..=100.0).contains(&t) {
                return Err(FocusError::config(format!(
                    "threshold {t} is outside 0-100"
                )));
            }
        }

        if let Some(stats) = &calibration {
            let expected = match algorithm {
                Algorithm::Composite => CalibrationMode::FullImage,
                Algorithm::Patch(_) => CalibrationMode::Patch,
            };
            if stats.mode() != expected {
                return Err(FocusError::calibration(format!(
                    "{} calibration cannot be used with the {} algorithm",
                    if stats.patch_mode { "patch-mode" } else { "full-image" },
                    algorithm.kind()
                )));
            }
        }

        let calibrated = calibration.is_some();
        let scorer = match algorithm {
            Algorithm::Composite => Scorer::Composite(CompositeScorer::new(calibration)),
            Algorithm::Patch(_) => {
                Scorer::Patch(PatchAnalyzer::new(PatchGrid::new(grid_size)?, calibration))
            }
        };
        let threshold = threshold.unwrap_or_else(|| algorithm.default_threshold(calibrated));

        debug!(%algorithm, threshold, calibrated, "blur engine ready");
        Ok(Self {
            algorithm,
            threshold,
            calibrated,
            scorer,
        })
    }

    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Effective decision threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    /// Scores one image.
    ///
    /// Kernel failures become a [`ScoreOutcome::Error`] record.
    #[must_use]
    pub fn score(&self, info: &ImageInfo) -> PerImageResult {
        let outcome = match self.score_details(info) {
            Ok((score, details)) => {
                let blurry = is_blurry(score, self.threshold);
                debug!(path = %info.path, score, blurry, "scored image");
                ScoreOutcome::Scored(ScoredImage {
                    dimensions: info.dimensions(),
                    score,
                    is_blurry: blurry,
                    details,
                })
            }
            Err(e) => {
                warn!(path = %info.path, error = %e, "failed to score image");
                ScoreOutcome::Error {
                    message: e.to_string(),
                }
            }
        };

        PerImageResult {
            path: info.path.clone(),
            timestamp: None,
            algorithm: self.algorithm.kind(),
            strategy: self.algorithm.strategy(),
            calibrated: self.calibrated,
            threshold: self.threshold,
            outcome,
        }
    }

    fn score_details(&self, info: &ImageInfo) -> Result<(f64, ScoreDetails)> {
        let view = info.image.view();
        match (&self.scorer, self.algorithm) {
            (Scorer::Composite(scorer), _) => {
                let score = scorer.score(&view)?;
                Ok((score.composite, ScoreDetails::Composite(score)))
            }
            (Scorer::Patch(analyzer), Algorithm::Patch(strategy)) => {
                let result = analyzer.analyze(&view)?;
                Ok((result.score(strategy), ScoreDetails::Patch(Box::new(result))))
            }
            (Scorer::Patch(_), Algorithm::Composite) => Err(FocusError::config(
                "patch analyzer configured without a strategy",
            )),
        }
    }
}
