//! Focus-measure kernels.
//!
//! Each kernel maps a grayscale view to one non-negative scalar where higher
//! means sharper. All four must run on the same view to be comparable.

mod laplacian;
mod sobel;
mod variance;

pub use laplacian::laplacian_variance;
pub use sobel::{gradient_mean, sobel_scores, tenengrad};
pub use variance::gray_variance;

use serde::{Deserialize, Serialize};

use crate::domain::{GrayView, RawScores};
use crate::error::{FocusError, Result};

/// One of the four focus-measure kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusMeasure {
    Laplacian,
    Gradient,
    Tenengrad,
    Variance,
}

impl FocusMeasure {
    pub const ALL: [Self; 4] = [
        Self::Laplacian,
        Self::Gradient,
        Self::Tenengrad,
        Self::Variance,
    ];

    /// Runs this kernel on `view`.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::Kernel`] if the view holds no pixels.
    pub fn compute(self, view: &GrayView<'_>) -> Result<f64> {
        match self {
            Self::Laplacian => laplacian_variance(view),
            Self::Gradient => gradient_mean(view),
            Self::Tenengrad => tenengrad(view),
            Self::Variance => gray_variance(view),
        }
    }

    /// Reads this measure's value out of a score set.
    #[must_use]
    pub const fn select(self, scores: &RawScores) -> f64 {
        match self {
            Self::Laplacian => scores.laplacian,
            Self::Gradient => scores.gradient,
            Self::Tenengrad => scores.tenengrad,
            Self::Variance => scores.variance,
        }
    }
}

/// Runs all four kernels on `view`, fanning out over the rayon pool.
///
/// Gradient and Tenengrad share one Sobel pass. No kernel allocates a
/// per-pixel buffer.
///
/// # Errors
///
/// Returns the first kernel failure; no partial scores are produced.
pub fn measure_all(view: &GrayView<'_>) -> Result<RawScores> {
    let ((laplacian, variance), sobel) = rayon::join(
        || {
            rayon::join(
                || FocusMeasure::Laplacian.compute(view),
                || FocusMeasure::Variance.compute(view),
            )
        },
        || sobel_scores(view),
    );
    let (gradient, tenengrad) = sobel?;

    Ok(RawScores {
        laplacian: laplacian?,
        gradient,
        tenengrad,
        variance: variance?,
    })
}

/// 3x3 neighbourhood around an interior pixel.
struct Window<'a> {
    above: &'a [u8],
    row: &'a [u8],
    below: &'a [u8],
    x: usize,
}

impl Window<'_> {
    fn at(&self, r: &[u8], dx: isize) -> i32 {
        i32::from(r[self.x.wrapping_add_signed(dx)])
    }
}

/// Visits every pixel in row-major order, passing the 3x3 window for
/// interior pixels and `None` for the one-pixel border.
fn scan_3x3(view: &GrayView<'_>, mut visit: impl FnMut(Option<&Window<'_>>)) {
    let width = view.width() as usize;
    let height = view.height();

    for y in 0..height {
        if width < 3 || y == 0 || y + 1 >= height {
            (0..width).for_each(|_| visit(None));
            continue;
        }
        let above = view.row(y - 1);
        let row = view.row(y);
        let below = view.row(y + 1);

        visit(None);
        for x in 1..width - 1 {
            visit(Some(&Window {
                above,
                row,
                below,
                x,
            }));
        }
        visit(None);
    }
}

fn ensure_readable(view: &GrayView<'_>) -> Result<()> {
    if view.is_empty() {
        return Err(FocusError::kernel(format!(
            "cannot measure an empty {}x{} buffer",
            view.width(),
            view.height()
        )));
    }
    Ok(())
}
