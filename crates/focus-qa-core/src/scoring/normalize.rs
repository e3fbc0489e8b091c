//! Mapping raw focus measures onto a 0-100 scale.

use std::sync::Arc;

use crate::calibration::{AlgorithmStats, CalibrationStats};
use crate::domain::{NormalizedScores, RawScores};

/// Hand-tuned divisors for the linear channels.
mod hand_tuned {
    pub const LAPLACIAN_DIVISOR: f64 = 0.5;
    pub const GRADIENT_DIVISOR: f64 = 0.3;
    pub const VARIANCE_DIVISOR: f64 = 10.0;
    /// `log10(tenengrad)` mapped from this range onto 0-100.
    pub const TENENGRAD_LOG_RANGE: (f64, f64) = (2.0, 8.0);
}

/// Fallback `log10` range for peak-focus when no calibration is loaded.
pub const PEAK_FOCUS_LOG_RANGE: (f64, f64) = (3.0, 9.0);

/// Turns raw kernel output into normalized scores.
///
/// Without calibration the fixed hand-tuned maps apply; with calibration
/// every channel is mapped through its p5..p95 window.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    calibration: Option<Arc<CalibrationStats>>,
}

impl Normalizer {
    #[must_use]
    pub const fn new(calibration: Option<Arc<CalibrationStats>>) -> Self {
        Self { calibration }
    }

    #[must_use]
    pub fn calibration(&self) -> Option<&CalibrationStats> {
        self.calibration.as_deref()
    }

    #[must_use]
    pub const fn is_calibrated(&self) -> bool {
        self.calibration.is_some()
    }

    /// Normalizes all four channels.
    #[must_use]
    pub fn normalize(&self, raw: &RawScores) -> NormalizedScores {
        self.calibration().map_or_else(
            || hand_tuned_scores(raw),
            |stats| calibrated_scores(raw, stats),
        )
    }

    /// Normalizes a single raw Tenengrad value the way peak-focus does.
    #[must_use]
    pub fn peak_tenengrad(&self, raw: f64) -> f64 {
        match self.calibration() {
            Some(stats) => log_percentile(raw, &stats.tenengrad),
            None => log_range(raw, PEAK_FOCUS_LOG_RANGE.0, PEAK_FOCUS_LOG_RANGE.1),
        }
    }
}

/// Fixed linear/log maps used when no calibration is available.
#[must_use]
pub fn hand_tuned_scores(raw: &RawScores) -> NormalizedScores {
    let (log_low, log_high) = hand_tuned::TENENGRAD_LOG_RANGE;
    NormalizedScores {
        laplacian: clip_score(raw.laplacian / hand_tuned::LAPLACIAN_DIVISOR),
        gradient: clip_score(raw.gradient / hand_tuned::GRADIENT_DIVISOR),
        tenengrad: log_range(raw.tenengrad, log_low, log_high),
        variance: clip_score(raw.variance / hand_tuned::VARIANCE_DIVISOR),
    }
}

/// Percentile maps driven by a calibration dataset.
#[must_use]
pub fn calibrated_scores(raw: &RawScores, stats: &CalibrationStats) -> NormalizedScores {
    NormalizedScores {
        laplacian: linear_percentile(raw.laplacian, &stats.laplacian),
        gradient: linear_percentile(raw.gradient, &stats.gradient),
        tenengrad: log_percentile(raw.tenengrad, &stats.tenengrad),
        variance: linear_percentile(raw.variance, &stats.variance),
    }
}

/// `100 * clip((raw - p5) / (p95 - p5), 0, 1)`.
#[must_use]
pub fn linear_percentile(raw: f64, stats: &AlgorithmStats) -> f64 {
    unit_map(raw, stats.p5, stats.p95)
}

/// Percentile map in `log10` space; non-positive values take log 0.
#[must_use]
pub fn log_percentile(raw: f64, stats: &AlgorithmStats) -> f64 {
    unit_map(safe_log10(raw), safe_log10(stats.p5), safe_log10(stats.p95))
}

/// Maps `log10(raw)` from `[low, high]` onto 0-100.
#[must_use]
pub fn log_range(raw: f64, low: f64, high: f64) -> f64 {
    unit_map(safe_log10(raw), low, high)
}

fn unit_map(value: f64, low: f64, high: f64) -> f64 {
    let span = high - low;
    if span <= 0.0 {
        // Degenerate window: a step at `low`.
        return if value > low { 100.0 } else { 0.0 };
    }
    100.0 * ((value - low) / span).clamp(0.0, 1.0)
}

fn safe_log10(value: f64) -> f64 {
    if value > 0.0 {
        value.log10()
    } else {
        0.0
    }
}

fn clip_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
