//! Gray-level variance.

use super::ensure_readable;
use crate::domain::GrayView;
use crate::error::Result;

/// Population variance of the raw intensities, no convolution.
///
/// Accumulated through a 256-bin histogram so the pass over the view is a
/// plain count.
///
/// # Errors
///
/// Returns a kernel error for an empty view.
#[allow(clippy::cast_precision_loss)]
pub fn gray_variance(view: &GrayView<'_>) -> Result<f64> {
    ensure_readable(view)?;

    let mut bins = [0u64; 256];
    for value in view.iter() {
        bins[usize::from(value)] += 1;
    }
    let total = view.len() as f64;

    let sum: u64 = bins
        .iter()
        .enumerate()
        .map(|(level, &count)| level as u64 * count)
        .sum();
    let mean = sum as f64 / total;

    let variance = bins
        .iter()
        .enumerate()
        .map(|(level, &count)| {
            let diff = level as f64 - mean;
            diff * diff * count as f64
        })
        .sum::<f64>()
        / total;

    Ok(variance)
}
