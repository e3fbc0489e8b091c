//! Patch partitioning and aggregation strategies.

mod aggregate;
mod analyzer;
mod grid;

pub use aggregate::{
    center_weighted_score, peak_focus_score, ranked_indices, retained_count, subject_focus_score,
    AggregationResult, BlurHistogram, Patch, SubjectFocusScores, CENTER_WEIGHT_SIGMA,
    MIN_SUBJECT_PATCHES, PEAK_FOCUS_PATCHES, SHARP_PATCH_THRESHOLD,
};
pub use analyzer::PatchAnalyzer;
pub use grid::{PatchGrid, PixelBounds, DEFAULT_GRID_SIZE};
