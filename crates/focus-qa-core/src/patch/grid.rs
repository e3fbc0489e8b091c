//! Partitioning an image into a square grid of patch views.

use serde::{Deserialize, Serialize};

use crate::domain::GrayView;
use crate::error::{FocusError, Result};

/// Default number of patches along each axis.
pub const DEFAULT_GRID_SIZE: u32 = 8;

/// Pixel rectangle covered by a patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBounds {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// A `size` x `size` partition of an image.
///
/// Patch dimensions are `floor(width / size)` x `floor(height / size)`;
/// the remainder pixels on the right and bottom are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchGrid {
    size: u32,
}

impl PatchGrid {
    /// # Errors
    ///
    /// Returns [`FocusError::Config`] for a zero grid size.
    pub fn new(size: u32) -> Result<Self> {
        if size == 0 {
            return Err(FocusError::config("patch grid size must be positive"));
        }
        Ok(Self { size })
    }

    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Number of patches in the grid.
    #[must_use]
    pub const fn patch_count(&self) -> usize {
        self.size as usize * self.size as usize
    }

    /// Grid coordinates of the patch at row-major `index`.
    #[must_use]
    pub const fn coords(&self, index: usize) -> (u32, u32) {
        let size = self.size as usize;
        #[allow(clippy::cast_possible_truncation)]
        let coords = ((index % size) as u32, (index / size) as u32);
        coords
    }

    /// Pixel bounds of patch `(x, y)` for an image of the given size.
    #[must_use]
    pub const fn bounds(&self, x: u32, y: u32, image_width: u32, image_height: u32) -> PixelBounds {
        let width = image_width / self.size;
        let height = image_height / self.size;
        PixelBounds {
            left: x * width,
            top: y * height,
            width,
            height,
        }
    }

    /// Borrowed views over every patch, row-major.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::Kernel`] when the image is smaller than the
    /// grid, so that patches would hold no pixels.
    pub fn views<'a>(&self, view: &GrayView<'a>) -> Result<Vec<(PixelBounds, GrayView<'a>)>> {
        if view.width() < self.size || view.height() < self.size {
            return Err(FocusError::kernel(format!(
                "image {}x{} is smaller than a {n}x{n} patch grid",
                view.width(),
                view.height(),
                n = self.size
            )));
        }

        (0..self.patch_count())
            .map(|index| {
                let (x, y) = self.coords(index);
                let bounds = self.bounds(x, y, view.width(), view.height());
                let patch = view.sub_view(bounds.left, bounds.top, bounds.width, bounds.height)?;
                Ok((bounds, patch))
            })
            .collect()
    }

    /// Gaussian position weight of every patch, row-major.
    ///
    /// Distance is measured from the grid center and scaled so the outermost
    /// patch along each axis sits at 1.
    #[must_use]
    pub fn position_weights(&self, sigma: f64) -> Vec<f64> {
        let center = f64::from(self.size - 1) / 2.0;
        let axis = |c: u32| {
            if center > 0.0 {
                (f64::from(c) - center) / center
            } else {
                0.0
            }
        };

        (0..self.patch_count())
            .map(|index| {
                let (x, y) = self.coords(index);
                let (dx, dy) = (axis(x), axis(y));
                let distance_sq = dx * dx + dy * dy;
                (-distance_sq / (2.0 * sigma * sigma)).exp()
            })
            .collect()
    }
}

impl Default for PatchGrid {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
        }
    }
}
