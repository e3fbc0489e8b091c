//! Collapsing per-patch scores into decision scores and diagnostics.

use serde::{Deserialize, Serialize};

use super::grid::{PatchGrid, PixelBounds};
use crate::domain::{CompositeScore, Strategy, SubjectFocusLevel, SubjectFocusParams};
use crate::scoring::Normalizer;
use crate::stats::{mean, percentile, sorted};

/// Patches scoring above this count as sharp in the diagnostics.
pub const SHARP_PATCH_THRESHOLD: f64 = 30.0;
/// Gaussian sigma of the center-weighted strategy.
pub const CENTER_WEIGHT_SIGMA: f64 = 0.5;
/// Patches averaged by peak-focus.
pub const PEAK_FOCUS_PATCHES: usize = 3;
/// Lower bound on patches retained by subject-focus.
pub const MIN_SUBJECT_PATCHES: usize = 3;

/// One scored grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    /// Column in the grid.
    pub x: u32,
    /// Row in the grid.
    pub y: u32,
    /// Pixel region of the patch.
    pub bounds: PixelBounds,
    /// Scores of the patch pixels.
    pub score: CompositeScore,
}

/// Patch counts per composite-score band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlurHistogram {
    /// Below 10.
    pub very_blurry: usize,
    /// 10 to 25.
    pub blurry: usize,
    /// 25 to 40.
    pub borderline: usize,
    /// 40 to 60.
    pub sharp: usize,
    /// 60 and above.
    pub very_sharp: usize,
}

impl BlurHistogram {
    #[must_use]
    pub fn from_scores(scores: &[f64]) -> Self {
        let mut histogram = Self::default();
        for &score in scores {
            let bucket = match score {
                s if s < 10.0 => &mut histogram.very_blurry,
                s if s < 25.0 => &mut histogram.blurry,
                s if s < 40.0 => &mut histogram.borderline,
                s if s < 60.0 => &mut histogram.sharp,
                _ => &mut histogram.very_sharp,
            };
            *bucket += 1;
        }
        histogram
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.very_blurry + self.blurry + self.borderline + self.sharp + self.very_sharp
    }
}

/// Output of each subject-focus variant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SubjectFocusScores {
    pub aggressive: f64,
    pub standard: f64,
    pub conservative: f64,
    pub relaxed: f64,
    pub strict: f64,
    pub very_strict: f64,
}

impl SubjectFocusScores {
    #[must_use]
    pub const fn get(&self, level: SubjectFocusLevel) -> f64 {
        match level {
            SubjectFocusLevel::Aggressive => self.aggressive,
            SubjectFocusLevel::Standard => self.standard,
            SubjectFocusLevel::Conservative => self.conservative,
            SubjectFocusLevel::Relaxed => self.relaxed,
            SubjectFocusLevel::Strict => self.strict,
            SubjectFocusLevel::VeryStrict => self.very_strict,
        }
    }

    fn set(&mut self, level: SubjectFocusLevel, value: f64) {
        let slot = match level {
            SubjectFocusLevel::Aggressive => &mut self.aggressive,
            SubjectFocusLevel::Standard => &mut self.standard,
            SubjectFocusLevel::Conservative => &mut self.conservative,
            SubjectFocusLevel::Relaxed => &mut self.relaxed,
            SubjectFocusLevel::Strict => &mut self.strict,
            SubjectFocusLevel::VeryStrict => &mut self.very_strict,
        };
        *slot = value;
    }
}

/// Every strategy output plus grid diagnostics for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub max_focus: f64,
    /// Diagnostic only.
    pub min_focus: f64,
    pub average: f64,
    pub median: f64,
    pub top25_percentile: f64,
    /// 90th percentile; diagnostic only.
    pub top10_percentile: f64,
    pub center_weighted: f64,
    pub subject_focus: SubjectFocusScores,
    pub peak_focus: f64,
    pub patch_count: usize,
    pub sharp_patch_count: usize,
    pub sharp_patch_ratio: f64,
    pub histogram: BlurHistogram,
    /// Composite score per patch, indexed `[row][column]`.
    pub blur_map: Vec<Vec<f64>>,
    /// Patches in row-major order.
    pub patches: Vec<Patch>,
}

impl AggregationResult {
    /// Runs every strategy over the row-major `patches` of `grid`.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn aggregate(grid: &PatchGrid, patches: Vec<Patch>, normalizer: &Normalizer) -> Self {
        let scores: Vec<f64> = patches.iter().map(|p| p.score.composite).collect();
        let ascending = sorted(&scores);

        let mut subject_focus = SubjectFocusScores::default();
        for level in SubjectFocusLevel::ALL {
            subject_focus.set(level, subject_focus_score(&scores, grid, level.params()));
        }

        let sharp_patch_count = scores.iter().filter(|&&s| s > SHARP_PATCH_THRESHOLD).count();
        let sharp_patch_ratio = if scores.is_empty() {
            0.0
        } else {
            sharp_patch_count as f64 / scores.len() as f64
        };

        let blur_map = scores
            .chunks(grid.size() as usize)
            .map(<[f64]>::to_vec)
            .collect();

        Self {
            max_focus: ascending.last().copied().unwrap_or(0.0),
            min_focus: ascending.first().copied().unwrap_or(0.0),
            average: mean(&scores),
            median: percentile(&ascending, 50.0),
            top25_percentile: percentile(&ascending, 75.0),
            top10_percentile: percentile(&ascending, 90.0),
            center_weighted: center_weighted_score(&scores, grid),
            subject_focus,
            peak_focus: peak_focus_score(&patches, normalizer),
            patch_count: patches.len(),
            sharp_patch_count,
            sharp_patch_ratio,
            histogram: BlurHistogram::from_scores(&scores),
            blur_map,
            patches,
        }
    }

    /// Decision score of a selectable strategy.
    #[must_use]
    pub const fn score(&self, strategy: Strategy) -> f64 {
        match strategy {
            Strategy::MaxFocus => self.max_focus,
            Strategy::Average => self.average,
            Strategy::Median => self.median,
            Strategy::Top25Percentile => self.top25_percentile,
            Strategy::CenterWeighted => self.center_weighted,
            Strategy::SubjectFocus(level) => self.subject_focus.get(level),
            Strategy::PeakFocus => self.peak_focus,
        }
    }
}

/// Patch indices ordered by descending composite score; ties keep grid order.
#[must_use]
pub fn ranked_indices(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
    order
}

/// Number of patches subject-focus keeps out of `patch_count`.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
#[must_use]
pub fn retained_count(patch_count: usize, top_percent: f64) -> usize {
    let wanted = (patch_count as f64 * top_percent).ceil() as usize;
    wanted.max(MIN_SUBJECT_PATCHES).min(patch_count)
}

/// Gaussian-weighted mean over all patches.
#[must_use]
pub fn center_weighted_score(scores: &[f64], grid: &PatchGrid) -> f64 {
    let weights = grid.position_weights(CENTER_WEIGHT_SIGMA);
    weighted_mean(scores.iter().copied().zip(weights))
}

/// Position-weighted mean over the best-scoring patches only.
///
/// Weights are renormalized within the retained subset.
#[must_use]
pub fn subject_focus_score(scores: &[f64], grid: &PatchGrid, params: SubjectFocusParams) -> f64 {
    let weights = grid.position_weights(params.sigma);
    let keep = retained_count(scores.len(), params.top_percent);
    weighted_mean(
        ranked_indices(scores)
            .into_iter()
            .take(keep)
            .map(|i| (scores[i], weights[i])),
    )
}

/// Normalized mean raw Tenengrad of the top patches by composite score.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn peak_focus_score(patches: &[Patch], normalizer: &Normalizer) -> f64 {
    if patches.is_empty() {
        return 0.0;
    }
    let scores: Vec<f64> = patches.iter().map(|p| p.score.composite).collect();
    let top: Vec<f64> = ranked_indices(&scores)
        .into_iter()
        .take(PEAK_FOCUS_PATCHES)
        .map(|i| patches[i].score.raw.tenengrad)
        .collect();
    normalizer.peak_tenengrad(mean(&top))
}

fn weighted_mean(pairs: impl Iterator<Item = (f64, f64)>) -> f64 {
    let (sum, total) = pairs.fold((0.0, 0.0), |(sum, total), (value, weight)| {
        (sum + value * weight, total + weight)
    });
    if total > 0.0 {
        sum / total
    } else {
        0.0
    }
}
