//! Per-image input and result types.

use serde::{Deserialize, Serialize};

use super::{AlgorithmKind, CompositeScore, GrayscaleImage, Strategy};
use crate::patch::AggregationResult;

/// Image dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ImageDimensions {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A decoded image together with where it came from.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Path (or synthetic identifier) of the image.
    pub path: String,
    /// Decoded grayscale pixels.
    pub image: GrayscaleImage,
}

impl ImageInfo {
    #[must_use]
    pub fn new(path: impl Into<String>, image: GrayscaleImage) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    #[must_use]
    pub const fn dimensions(&self) -> ImageDimensions {
        ImageDimensions::new(self.image.width(), self.image.height())
    }
}

/// Scoring result for a single image.
///
/// Failures are carried as [`ScoreOutcome::Error`] so that one bad image
/// never aborts a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerImageResult {
    /// Path of the scored image.
    pub path: String,
    /// Time of scoring (RFC 3339), filled in by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Algorithm family used.
    pub algorithm: AlgorithmKind,
    /// Selected strategy for patch scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<Strategy>,
    /// Whether calibration statistics drove normalization.
    pub calibrated: bool,
    /// Effective decision threshold.
    pub threshold: f64,
    /// Scores or the error that prevented scoring.
    #[serde(flatten)]
    pub outcome: ScoreOutcome,
}

impl PerImageResult {
    /// The decision score, if scoring succeeded.
    #[must_use]
    pub const fn score(&self) -> Option<f64> {
        match &self.outcome {
            ScoreOutcome::Scored(scored) => Some(scored.score),
            ScoreOutcome::Error { .. } => None,
        }
    }

    /// The blurry verdict, if scoring succeeded.
    #[must_use]
    pub const fn is_blurry(&self) -> Option<bool> {
        match &self.outcome {
            ScoreOutcome::Scored(scored) => Some(scored.is_blurry),
            ScoreOutcome::Error { .. } => None,
        }
    }

    /// The error message, if scoring failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ScoreOutcome::Scored(_) => None,
            ScoreOutcome::Error { message } => Some(message),
        }
    }
}

/// Outcome of scoring one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScoreOutcome {
    /// The image was scored.
    Scored(ScoredImage),
    /// A kernel could not process the image.
    Error {
        /// Human-readable failure description.
        message: String,
    },
}

/// Successful scoring payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredImage {
    /// Image dimensions.
    pub dimensions: ImageDimensions,
    /// Decision score (composite or selected strategy).
    pub score: f64,
    /// `score < threshold`.
    pub is_blurry: bool,
    /// Algorithm-specific detail.
    pub details: ScoreDetails,
}

/// Algorithm-specific scoring detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreDetails {
    /// Whole-image raw, normalized and composite scores.
    Composite(CompositeScore),
    /// All strategy outputs and diagnostics for the patch grid.
    Patch(Box<AggregationResult>),
}
