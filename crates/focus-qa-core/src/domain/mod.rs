//! Core domain types for focus scoring.

mod algorithm;
mod gray;
mod result;
mod scores;

pub use algorithm::{
    is_blurry, thresholds, Algorithm, AlgorithmKind, Strategy, SubjectFocusLevel,
    SubjectFocusParams,
};
pub use gray::{GrayView, GrayscaleImage};
pub use result::{
    ImageDimensions, ImageInfo, PerImageResult, ScoreDetails, ScoreOutcome, ScoredImage,
};
pub use scores::{weights, CompositeScore, NormalizedScores, RawScores};
