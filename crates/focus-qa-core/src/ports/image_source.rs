//! Image source port for loading images to score.

use crate::domain::ImageInfo;

/// Port for loading decoded grayscale images.
pub trait ImageSource: Send + Sync {
    /// Returns an iterator over images from this source, in discovery order.
    ///
    /// # Errors
    ///
    /// Individual items are errors if an image fails to load; their chain
    /// carries an [`ImageLoadError`].
    fn images(&self) -> Box<dyn Iterator<Item = anyhow::Result<ImageInfo>> + Send + '_>;

    /// Returns the total number of images, if known.
    fn count_hint(&self) -> Option<usize>;
}

/// Failure to load one image, attached to the error items of
/// [`ImageSource::images`] so callers can report the path.
#[derive(Debug, thiserror::Error)]
#[error("{path}: {message}")]
pub struct ImageLoadError {
    /// Path of the image that failed.
    pub path: String,
    /// Decoder or I/O failure description.
    pub message: String,
}

impl ImageLoadError {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Finds the load error inside an `anyhow` chain.
    #[must_use]
    pub fn find(error: &anyhow::Error) -> Option<&Self> {
        error.chain().find_map(|e| e.downcast_ref::<Self>())
    }
}
