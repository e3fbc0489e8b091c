//! Synthetic image builders for testing.

use std::path::Path;

use focus_qa_core::domain::{GrayscaleImage, ImageInfo};

/// Builder for creating synthetic test images.
///
/// Provides convenience methods for generating images with known focus
/// characteristics (sharp edges, flat fields, smooth ramps, mixed regions).
pub struct SyntheticImageBuilder;

impl SyntheticImageBuilder {
    // === Sharp/High-Contrast Images ===

    /// Creates a high-contrast checkerboard pattern (very sharp edges).
    ///
    /// Saturates every focus measure; scores near 100.
    #[must_use]
    pub fn checkerboard(width: u32, height: u32) -> ImageInfo {
        Self::checkerboard_with_cell_size(width, height, 8)
    }

    /// Creates a checkerboard with custom cell size.
    #[must_use]
    pub fn checkerboard_with_cell_size(width: u32, height: u32, cell_size: u32) -> ImageInfo {
        let cell = cell_size.max(1);
        let img = GrayscaleImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                255
            } else {
                0
            }
        });
        ImageInfo::new("synthetic://checkerboard", img)
    }

    /// Creates vertical bars pattern (sharp edges).
    #[must_use]
    pub fn vertical_bars(width: u32, height: u32, bar_width: u32) -> ImageInfo {
        let bar = bar_width.max(1);
        let img = GrayscaleImage::from_fn(width, height, |x, _| if (x / bar) % 2 == 0 { 255 } else { 0 });
        ImageInfo::new("synthetic://vertical_bars", img)
    }

    /// Creates horizontal bars pattern (sharp edges).
    #[must_use]
    pub fn horizontal_bars(width: u32, height: u32, bar_height: u32) -> ImageInfo {
        let bar = bar_height.max(1);
        let img = GrayscaleImage::from_fn(width, height, |_, y| if (y / bar) % 2 == 0 { 255 } else { 0 });
        ImageInfo::new("synthetic://horizontal_bars", img)
    }

    // === Blurry Images ===

    /// Creates a uniform gray image (no edges, simulates severe blur).
    ///
    /// Every focus measure is exactly zero.
    #[must_use]
    pub fn uniform_gray(width: u32, height: u32, value: u8) -> ImageInfo {
        let img = GrayscaleImage::from_fn(width, height, |_, _| value);
        ImageInfo::new("synthetic://uniform_gray", img)
    }

    /// Creates a smooth horizontal gradient (weak edges, simulates defocus).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn horizontal_gradient(width: u32, height: u32) -> ImageInfo {
        let img = GrayscaleImage::from_fn(width, height, |x, _| {
            ((u32::from(u8::MAX) * x) / width.max(1)) as u8
        });
        ImageInfo::new("synthetic://horizontal_gradient", img)
    }

    /// Creates a vertical gradient.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn vertical_gradient(width: u32, height: u32) -> ImageInfo {
        let img = GrayscaleImage::from_fn(width, height, |_, y| {
            ((u32::from(u8::MAX) * y) / height.max(1)) as u8
        });
        ImageInfo::new("synthetic://vertical_gradient", img)
    }

    /// Box-blurs an image with the given radius, clamping at the borders.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn box_blurred(info: &ImageInfo, radius: u32) -> ImageInfo {
        let view = info.image.view();
        let (w, h) = (i64::from(view.width()), i64::from(view.height()));
        let r = i64::from(radius);
        let img = GrayscaleImage::from_fn(view.width(), view.height(), |x, y| {
            let (mut sum, mut count) = (0u64, 0u64);
            for dy in -r..=r {
                for dx in -r..=r {
                    let sx = (i64::from(x) + dx).clamp(0, w - 1) as u32;
                    let sy = (i64::from(y) + dy).clamp(0, h - 1) as u32;
                    sum += u64::from(view.get(sx, sy));
                    count += 1;
                }
            }
            (sum / count) as u8
        });
        ImageInfo::new(format!("{}#blur{radius}", info.path), img)
    }

    // === Mixed Images ===

    /// Creates an image whose left half is a checkerboard and right half is
    /// flat gray.
    #[must_use]
    pub fn half_sharp(width: u32, height: u32) -> ImageInfo {
        let img = GrayscaleImage::from_fn(width, height, |x, y| {
            if x < width / 2 {
                if (x / 4 + y / 4) % 2 == 0 {
                    255
                } else {
                    0
                }
            } else {
                128
            }
        });
        ImageInfo::new("synthetic://half_sharp", img)
    }

    /// Creates an image with a sharp center and flat edges.
    ///
    /// Useful for testing center-weighted and subject-focus strategies.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn sharp_center_blurry_edges(width: u32, height: u32) -> ImageInfo {
        let cx = (width / 2) as i32;
        let cy = (height / 2) as i32;
        let radius = (width.min(height) / 4) as i32;

        let img = GrayscaleImage::from_fn(width, height, |x, y| {
            let dx = (x as i32 - cx).abs();
            let dy = (y as i32 - cy).abs();
            let dist = dx.max(dy);

            if dist < radius {
                if (x / 4 + y / 4) % 2 == 0 {
                    255
                } else {
                    0
                }
            } else {
                128
            }
        });
        ImageInfo::new("synthetic://sharp_center", img)
    }

    // === Special Test Images ===

    /// Creates a 1x1 pixel image (no interior pixels).
    #[must_use]
    pub fn single_pixel(value: u8) -> ImageInfo {
        ImageInfo::new("synthetic://1x1", GrayscaleImage::from_fn(1, 1, |_, _| value))
    }

    /// Creates a tiny 2x2 image from explicit values.
    #[must_use]
    pub fn tiny(values: [[u8; 2]; 2]) -> ImageInfo {
        let img = GrayscaleImage::from_fn(2, 2, |x, y| values[y as usize][x as usize]);
        ImageInfo::new("synthetic://2x2", img)
    }
}

/// Convenience functions for common test images.
impl SyntheticImageBuilder {
    /// Returns a standard sharp test image (128x128 checkerboard).
    #[must_use]
    pub fn sharp_image() -> ImageInfo {
        Self::checkerboard(128, 128)
    }

    /// Returns a standard blurry test image (128x128 uniform gray).
    #[must_use]
    pub fn blurry_image() -> ImageInfo {
        Self::uniform_gray(128, 128, 128)
    }
}

/// Saves a synthetic image as an 8-bit grayscale PNG.
///
/// # Errors
///
/// Returns an error if encoding or writing fails.
pub fn write_png(info: &ImageInfo, path: &Path) -> anyhow::Result<()> {
    info.image.to_luma8().save(path)?;
    Ok(())
}
