//! Grayscale pixel buffers and borrowed views over them.

use crate::error::{FocusError, Result};

/// Decoded single-channel 8-bit image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GrayscaleImage {
    /// Wraps a row-major pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::Kernel`] if the buffer length does not match
    /// `width * height`.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(FocusError::kernel(format!(
                "pixel buffer holds {} bytes, expected {expected} for {width}x{height}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds an image by evaluating `f` for every pixel.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize));
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Converts a decoded image of any color type to luma.
    #[must_use]
    pub fn from_dynamic(image: &image::DynamicImage) -> Self {
        Self::from(image.to_luma8())
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw row-major pixel data.
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// A view covering the whole image.
    #[must_use]
    pub fn view(&self) -> GrayView<'_> {
        GrayView {
            pixels: &self.pixels,
            offset: 0,
            stride: self.width as usize,
            width: self.width,
            height: self.height,
        }
    }

    /// Converts back into an `image` buffer, e.g. for saving to disk.
    #[must_use]
    pub fn to_luma8(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([self.pixels[y as usize * self.width as usize + x as usize]])
        })
    }
}

impl From<image::GrayImage> for GrayscaleImage {
    fn from(image: image::GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }
}

/// Borrowed rectangular window over a [`GrayscaleImage`].
///
/// Rows are `stride` bytes apart in the parent buffer, so sub-views share
/// the decoded pixels instead of copying them.
#[derive(Debug, Clone, Copy)]
pub struct GrayView<'a> {
    pixels: &'a [u8],
    offset: usize,
    stride: usize,
    width: u32,
    height: u32,
}

impl<'a> GrayView<'a> {
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels covered by the view.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixel at view-local coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates fall outside the parent buffer.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        self.pixels[self.offset + y as usize * self.stride + x as usize]
    }

    /// One row of the view.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = self.offset + y as usize * self.stride;
        &self.pixels[start..start + self.width as usize]
    }

    /// Iterates pixels in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + 'a {
        let view = *self;
        (0..view.height).flat_map(move |y| view.row(y).iter().copied())
    }

    /// Narrows the view to a sub-rectangle in view-local coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`FocusError::Kernel`] if the rectangle does not fit.
    pub fn sub_view(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Self> {
        let fits_x = x.checked_add(width).is_some_and(|end| end <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|end| end <= self.height);
        if !fits_x || !fits_y {
            return Err(FocusError::kernel(format!(
                "region {width}x{height}+{x}+{y} exceeds view {}x{}",
                self.width, self.height
            )));
        }
        Ok(Self {
            pixels: self.pixels,
            offset: self.offset + y as usize * self.stride + x as usize,
            stride: self.stride,
            width,
            height,
        })
    }
}
