//! Progress reporting port for UI integration.

use crate::domain::PerImageResult;

/// Events emitted while a batch is scored.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Scoring started for an image.
    Started {
        /// Path to the image.
        path: String,
        /// Index in the batch (0-based).
        index: usize,
        /// Total images in batch, if known.
        total: Option<usize>,
    },
    /// Scoring finished for an image, successfully or with an error record.
    Completed {
        /// The per-image result.
        result: PerImageResult,
    },
    /// An image could not be loaded.
    Skipped {
        /// Path to the image.
        path: String,
        /// Reason for skipping.
        reason: String,
    },
    /// An image contributed data points to a calibration corpus.
    Sampled {
        /// Path to the image.
        path: String,
        /// Data points taken from it (1, or one per patch).
        data_points: usize,
    },
    /// All calibration images have been processed.
    SamplingFinished {
        /// Images that contributed samples.
        sampled: usize,
        /// Images that failed to load or measure.
        skipped: usize,
    },
    /// All images have been processed.
    Finished {
        /// Images that produced a score.
        scored: usize,
        /// Images judged blurry.
        blurry: usize,
        /// Images that failed to load or score.
        failed: usize,
    },
}

/// Port for receiving progress events.
pub trait ProgressSink: Send + Sync {
    /// Called when a progress event occurs.
    fn on_event(&self, event: ProgressEvent);
}
