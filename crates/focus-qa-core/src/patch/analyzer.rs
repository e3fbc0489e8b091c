//! Grid-based analysis of a single image.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use super::aggregate::{AggregationResult, Patch};
use super::grid::PatchGrid;
use crate::calibration::CalibrationStats;
use crate::domain::{GrayView, RawScores, Strategy};
use crate::error::Result;
use crate::measures::measure_all;
use crate::scoring::CompositeScorer;

/// Scores every patch of a grid and aggregates the results.
#[derive(Debug, Clone, Default)]
pub struct PatchAnalyzer {
    grid: PatchGrid,
    scorer: CompositeScorer,
}

impl PatchAnalyzer {
    /// Creates an analyzer; `None` selects the hand-tuned normalization.
    #[must_use]
    pub const fn new(grid: PatchGrid, calibration: Option<Arc<CalibrationStats>>) -> Self {
        Self {
            grid,
            scorer: CompositeScorer::new(calibration),
        }
    }

    #[must_use]
    pub const fn grid(&self) -> &PatchGrid {
        &self.grid
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.scorer.is_calibrated()
    }

    /// Default blurry threshold for `strategy` under the active normalization.
    #[must_use]
    pub const fn default_threshold(&self, strategy: Strategy) -> f64 {
        strategy.default_threshold(self.is_calibrated())
    }

    /// Scores all patches in parallel and runs every strategy.
    ///
    /// # Errors
    ///
    /// Fails if the image is smaller than the grid or a kernel fails on any
    /// patch.
    pub fn analyze(&self, view: &GrayView<'_>) -> Result<AggregationResult> {
        let patches = self
            .grid
            .views(view)?
            .into_par_iter()
            .enumerate()
            .map(|(index, (bounds, patch))| {
                let (x, y) = self.grid.coords(index);
                let score = self.scorer.score(&patch)?;
                Ok(Patch {
                    x,
                    y,
                    bounds,
                    score,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let result = AggregationResult::aggregate(&self.grid, patches, self.scorer.normalizer());
        debug!(
            grid = self.grid.size(),
            max = result.max_focus,
            average = result.average,
            peak = result.peak_focus,
            sharp_patches = result.sharp_patch_count,
            "aggregated patches"
        );
        Ok(result)
    }

    /// Raw kernel output for every patch, row-major, without normalization.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`PatchAnalyzer::analyze`].
    pub fn raw_scores(&self, view: &GrayView<'_>) -> Result<Vec<RawScores>> {
        self.grid
            .views(view)?
            .into_par_iter()
            .map(|(_, patch)| measure_all(&patch))
            .collect()
    }
}
