//! Error types for the scoring engine.

use std::path::PathBuf;

/// Errors raised by the scoring engine.
#[derive(Debug, thiserror::Error)]
pub enum FocusError {
    /// A focus-measure kernel could not process the pixel buffer.
    #[error("kernel error: {0}")]
    Kernel(String),

    /// The calibration corpus or calibration file is unusable.
    #[error("calibration error: {0}")]
    Calibration(String),

    /// Invalid engine configuration (unknown names, bad grid size, ...).
    #[error("config error: {0}")]
    Config(String),

    /// Reading or writing a calibration file failed.
    #[error("calibration file {path:?}: {source}")]
    CalibrationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A calibration file did not contain a valid calibration record.
    #[error("calibration file {path:?} is malformed: {source}")]
    CalibrationFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl FocusError {
    pub(crate) fn kernel(message: impl Into<String>) -> Self {
        Self::Kernel(message.into())
    }

    pub(crate) fn calibration(message: impl Into<String>) -> Self {
        Self::Calibration(message.into())
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns true for any calibration-related failure, including file errors.
    #[must_use]
    pub const fn is_calibration(&self) -> bool {
        matches!(
            self,
            Self::Calibration(_) | Self::CalibrationIo { .. } | Self::CalibrationFormat { .. }
        )
    }
}

/// Result alias used across the core crate.
pub type Result<T, E = FocusError> = std::result::Result<T, E>;
