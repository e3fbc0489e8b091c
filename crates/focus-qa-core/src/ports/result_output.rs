//! Result output port for writing scoring results.

use crate::domain::PerImageResult;

/// Port for outputting per-image results.
pub trait ResultOutput: Send + Sync {
    /// Writes a single result.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write(&self, result: &PerImageResult) -> anyhow::Result<()>;

    /// Flushes any buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    fn flush(&self) -> anyhow::Result<()>;
}
