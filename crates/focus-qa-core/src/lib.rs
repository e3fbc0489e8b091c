//! Focus QA Core - blur scoring engine
//!
//! Four focus measures (Laplacian variance, Sobel gradient mean, Tenengrad,
//! gray-level variance) are normalized to 0-100 and combined into a weighted
//! composite score. Images can be scored as a whole or as a grid of patches
//! collapsed by one of several strategies. Corpus calibration replaces the
//! hand-tuned normalization constants with measured percentiles.

pub mod calibration;
pub mod domain;
pub mod engine;
pub mod error;
pub mod measures;
pub mod patch;
pub mod ports;
pub mod scoring;
pub mod stats;

pub use calibration::{
    collect_calibration_inputs, compute_calibration, load_stats, save_stats, AlgorithmStats,
    CalibrationMode, CalibrationSample, CalibrationStats,
};
pub use domain::{
    is_blurry, Algorithm, AlgorithmKind, CompositeScore, GrayView, GrayscaleImage, ImageInfo,
    PerImageResult, RawScores, ScoreDetails, ScoreOutcome, Strategy, SubjectFocusLevel,
};
pub use engine::{BlurEngine, EngineConfig};
pub use error::{FocusError, Result};
pub use ports::{ImageLoadError, ImageSource, ProgressEvent, ProgressSink, ResultOutput};
pub use stats::percentile;
