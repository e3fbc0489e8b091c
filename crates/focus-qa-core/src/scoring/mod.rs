//! Normalization and composite scoring.

mod composite;
mod normalize;

pub use composite::CompositeScorer;
pub use normalize::{
    calibrated_scores, hand_tuned_scores, linear_percentile, log_percentile, log_range, Normalizer,
    PEAK_FOCUS_LOG_RANGE,
};
