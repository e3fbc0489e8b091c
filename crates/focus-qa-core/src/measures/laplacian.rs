//! Variance of the Laplacian.

use super::{ensure_readable, scan_3x3};
use crate::domain::GrayView;
use crate::error::Result;
use crate::stats::RunningMoments;

/// Variance of the 4-neighbour Laplacian response.
///
/// Kernel:
/// ```text
/// [ 0  1  0 ]
/// [ 1 -4  1 ]
/// [ 0  1  0 ]
/// ```
/// Only interior pixels are filtered. The one-pixel border keeps a zero
/// response but still counts towards the variance denominator.
///
/// # Errors
///
/// Returns a kernel error for an empty view.
pub fn laplacian_variance(view: &GrayView<'_>) -> Result<f64> {
    ensure_readable(view)?;

    let mut moments = RunningMoments::new();
    scan_3x3(view, |window| {
        let response = window.map_or(0, |w| {
            w.at(w.above, 0) + w.at(w.below, 0) + w.at(w.row, -1) + w.at(w.row, 1)
                - 4 * w.at(w.row, 0)
        });
        moments.push(f64::from(response));
    });

    Ok(moments.variance())
}
