//! Scoring algorithm and aggregation strategy selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FocusError;

/// Default decision thresholds on the 0-100 scale.
pub mod thresholds {
    /// Composite and non-peak strategies, hand-tuned normalization.
    pub const DEFAULT: f64 = 30.0;
    /// Composite and non-peak strategies, calibrated normalization.
    pub const DEFAULT_CALIBRATED: f64 = 25.0;
    /// Peak-focus, hand-tuned normalization.
    pub const PEAK_FOCUS: f64 = 75.0;
    /// Peak-focus, calibrated normalization.
    pub const PEAK_FOCUS_CALIBRATED: f64 = 70.0;
}

/// How an image is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Whole-image composite score.
    #[default]
    Composite,
    /// Grid of patches collapsed by the given strategy.
    Patch(Strategy),
}

impl Algorithm {
    /// Short name used in reports and config files.
    #[must_use]
    pub const fn kind(&self) -> AlgorithmKind {
        match self {
            Self::Composite => AlgorithmKind::Composite,
            Self::Patch(_) => AlgorithmKind::Patch,
        }
    }

    /// The selected strategy, for patch scoring.
    #[must_use]
    pub const fn strategy(&self) -> Option<Strategy> {
        match self {
            Self::Composite => None,
            Self::Patch(strategy) => Some(*strategy),
        }
    }

    /// Threshold used when the caller does not set one.
    #[must_use]
    pub const fn default_threshold(&self, calibrated: bool) -> f64 {
        match self {
            Self::Composite => {
                if calibrated {
                    thresholds::DEFAULT_CALIBRATED
                } else {
                    thresholds::DEFAULT
                }
            }
            Self::Patch(strategy) => strategy.default_threshold(calibrated),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composite => f.write_str("composite"),
            Self::Patch(strategy) => write!(f, "patch:{strategy}"),
        }
    }
}

/// Algorithm family without strategy parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    #[default]
    Composite,
    Patch,
}

impl AlgorithmKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Composite => "composite",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlgorithmKind {
    type Err = FocusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "composite" => Ok(Self::Composite),
            "patch" => Ok(Self::Patch),
            other => Err(FocusError::config(format!(
                "unsupported algorithm '{other}' (expected 'composite' or 'patch')"
            ))),
        }
    }
}

/// Rule for collapsing per-patch composite scores into one decision score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Strategy {
    MaxFocus,
    Average,
    Median,
    /// 75th percentile of patch scores.
    Top25Percentile,
    CenterWeighted,
    SubjectFocus(SubjectFocusLevel),
    /// Log-normalized mean raw Tenengrad of the three best patches.
    PeakFocus,
}

impl Strategy {
    /// Every selectable strategy, in report order.
    pub const ALL: [Self; 12] = [
        Self::MaxFocus,
        Self::Average,
        Self::Median,
        Self::Top25Percentile,
        Self::CenterWeighted,
        Self::SubjectFocus(SubjectFocusLevel::Aggressive),
        Self::SubjectFocus(SubjectFocusLevel::Standard),
        Self::SubjectFocus(SubjectFocusLevel::Conservative),
        Self::SubjectFocus(SubjectFocusLevel::Relaxed),
        Self::SubjectFocus(SubjectFocusLevel::Strict),
        Self::SubjectFocus(SubjectFocusLevel::VeryStrict),
        Self::PeakFocus,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MaxFocus => "max-focus",
            Self::Average => "average",
            Self::Median => "median",
            Self::Top25Percentile => "top-25-percentile",
            Self::CenterWeighted => "center-weighted",
            Self::SubjectFocus(level) => level.name(),
            Self::PeakFocus => "peak-focus",
        }
    }

    /// Threshold used when the caller does not set one.
    ///
    /// Peak-focus only looks at three patches and needs a stricter cut.
    #[must_use]
    pub const fn default_threshold(&self, calibrated: bool) -> f64 {
        match (self, calibrated) {
            (Self::PeakFocus, true) => thresholds::PEAK_FOCUS_CALIBRATED,
            (Self::PeakFocus, false) => thresholds::PEAK_FOCUS,
            (_, true) => thresholds::DEFAULT_CALIBRATED,
            (_, false) => thresholds::DEFAULT,
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::SubjectFocus(SubjectFocusLevel::Standard)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = FocusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| FocusError::config(format!("unsupported strategy '{s}'")))
    }
}

impl TryFrom<String> for Strategy {
    type Error = FocusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.name().to_string()
    }
}

/// Variants of the subject-focus strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubjectFocusLevel {
    Aggressive,
    Standard,
    Conservative,
    Relaxed,
    Strict,
    VeryStrict,
}

/// Parameters of one subject-focus variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubjectFocusParams {
    /// Fraction of the best patches kept (at least three are kept).
    pub top_percent: f64,
    /// Standard deviation of the Gaussian position weight.
    pub sigma: f64,
}

impl SubjectFocusLevel {
    pub const ALL: [Self; 6] = [
        Self::Aggressive,
        Self::Standard,
        Self::Conservative,
        Self::Relaxed,
        Self::Strict,
        Self::VeryStrict,
    ];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Aggressive => "subject-focus-aggressive",
            Self::Standard => "subject-focus",
            Self::Conservative => "subject-focus-conservative",
            Self::Relaxed => "subject-focus-relaxed",
            Self::Strict => "subject-focus-strict",
            Self::VeryStrict => "subject-focus-very-strict",
        }
    }

    #[must_use]
    pub const fn params(&self) -> SubjectFocusParams {
        let (top_percent, sigma) = match self {
            Self::Aggressive => (0.08, 1.5),
            Self::Standard => (0.12, 1.0),
            Self::Conservative => (0.18, 0.7),
            Self::Relaxed => (0.28, 0.5),
            Self::Strict => (0.38, 0.4),
            Self::VeryStrict => (0.40, 0.35),
        };
        SubjectFocusParams { top_percent, sigma }
    }
}

/// Decision rule shared by every algorithm.
#[must_use]
pub fn is_blurry(score: f64, threshold: f64) -> bool {
    score < threshold
}
