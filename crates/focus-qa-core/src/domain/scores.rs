//! Raw, normalized and composite focus scores.

use serde::{Deserialize, Serialize};

/// Weight of each normalized focus measure in the composite score.
pub mod weights {
    pub const LAPLACIAN: f64 = 0.30;
    pub const GRADIENT: f64 = 0.20;
    pub const TENENGRAD: f64 = 0.40;
    pub const VARIANCE: f64 = 0.10;
}

/// Unnormalized output of the four focus-measure kernels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawScores {
    /// Variance of the Laplacian response.
    pub laplacian: f64,
    /// Mean Sobel gradient magnitude.
    pub gradient: f64,
    /// Variance of the squared Sobel magnitude.
    pub tenengrad: f64,
    /// Variance of the gray levels.
    pub variance: f64,
}

impl RawScores {
    /// True when every score is finite and non-negative.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        [self.laplacian, self.gradient, self.tenengrad, self.variance]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Focus measures mapped onto 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedScores {
    pub laplacian: f64,
    pub gradient: f64,
    pub tenengrad: f64,
    pub variance: f64,
}

impl NormalizedScores {
    /// Weighted sum of the four channels.
    ///
    /// Not re-clipped: each channel is already within 0-100 and the weights
    /// sum to one.
    #[must_use]
    pub fn composite(&self) -> f64 {
        weights::LAPLACIAN * self.laplacian
            + weights::GRADIENT * self.gradient
            + weights::TENENGRAD * self.tenengrad
            + weights::VARIANCE * self.variance
    }
}

/// Full scoring result for one image or patch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub raw: RawScores,
    pub normalized: NormalizedScores,
    pub composite: f64,
}

impl CompositeScore {
    #[must_use]
    pub fn new(raw: RawScores, normalized: NormalizedScores) -> Self {
        Self {
            raw,
            normalized,
            composite: normalized.composite(),
        }
    }
}
