//! Sobel-based focus measures: mean gradient magnitude and Tenengrad.

use super::{ensure_readable, scan_3x3, Window};
use crate::domain::GrayView;
use crate::error::Result;
use crate::stats::RunningMoments;

/// Squared Sobel magnitude `gx^2 + gy^2` at an interior pixel.
fn squared_magnitude(w: &Window<'_>) -> f64 {
    let gx = (w.at(w.above, 1) + 2 * w.at(w.row, 1) + w.at(w.below, 1))
        - (w.at(w.above, -1) + 2 * w.at(w.row, -1) + w.at(w.below, -1));
    let gy = (w.at(w.below, -1) + 2 * w.at(w.below, 0) + w.at(w.below, 1))
        - (w.at(w.above, -1) + 2 * w.at(w.above, 0) + w.at(w.above, 1));
    f64::from(gx * gx + gy * gy)
}

/// Gradient mean and Tenengrad from a single Sobel pass.
///
/// Border pixels contribute a zero response to both.
///
/// # Errors
///
/// Returns a kernel error for an empty view.
pub fn sobel_scores(view: &GrayView<'_>) -> Result<(f64, f64)> {
    ensure_readable(view)?;

    let mut magnitude = RunningMoments::new();
    let mut squared = RunningMoments::new();
    scan_3x3(view, |window| {
        let sq = window.map_or(0.0, squared_magnitude);
        magnitude.push(sq.sqrt());
        squared.push(sq);
    });

    Ok((magnitude.mean(), squared.variance()))
}

/// Mean Sobel gradient magnitude over the whole view.
///
/// # Errors
///
/// Returns a kernel error for an empty view.
pub fn gradient_mean(view: &GrayView<'_>) -> Result<f64> {
    sobel_scores(view).map(|(gradient, _)| gradient)
}

/// Tenengrad: population variance of the squared Sobel magnitude.
///
/// Spans many orders of magnitude (roughly 1e2 to 1e9 on real photos),
/// which is why it is normalized in log space.
///
/// # Errors
///
/// Returns a kernel error for an empty view.
pub fn tenengrad(view: &GrayView<'_>) -> Result<f64> {
    sobel_scores(view).map(|(_, tenengrad)| tenengrad)
}
