//! Corpus calibration: percentile statistics that replace the hand-tuned
//! normalization constants.

mod collect;
mod stats;
mod store;

pub use collect::{collect_calibration_inputs, CalibrationSample};
pub use stats::{
    compute_calibration, AlgorithmStats, CalibrationMode, CalibrationStats, CALIBRATION_VERSION,
};
pub use store::{from_json, load_stats, save_stats, to_json};
