//! JSON persistence of calibration records.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::CalibrationStats;
use crate::error::{FocusError, Result};

/// Serializes a record as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`FocusError::Calibration`] if serialization fails.
pub fn to_json(stats: &CalibrationStats) -> Result<String> {
    serde_json::to_string_pretty(stats)
        .map_err(|e| FocusError::calibration(format!("failed to serialize calibration: {e}")))
}

/// Parses and validates a record.
///
/// # Errors
///
/// Returns [`FocusError::Calibration`] for malformed JSON or a record that
/// fails [`CalibrationStats::validate`].
pub fn from_json(json: &str) -> Result<CalibrationStats> {
    let stats: CalibrationStats = serde_json::from_str(json)
        .map_err(|e| FocusError::calibration(format!("malformed calibration record: {e}")))?;
    stats.validate()?;
    Ok(stats)
}

/// Writes a record to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`FocusError::CalibrationIo`] if the file cannot be written.
pub fn save_stats(stats: &CalibrationStats, path: &Path) -> Result<()> {
    let io_err = |source| FocusError::CalibrationIo {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut json = to_json(stats)?;
    json.push('\n');
    fs::write(path, json).map_err(io_err)?;
    info!(path = %path.display(), "saved calibration");
    Ok(())
}

/// Reads and validates a record from `path`.
///
/// # Errors
///
/// Returns [`FocusError::CalibrationIo`] if the file cannot be read,
/// [`FocusError::CalibrationFormat`] if it is not a calibration record, and
/// [`FocusError::Calibration`] if the record fails validation.
pub fn load_stats(path: &Path) -> Result<CalibrationStats> {
    let content = fs::read_to_string(path).map_err(|source| FocusError::CalibrationIo {
        path: path.to_path_buf(),
        source,
    })?;
    let stats: CalibrationStats =
        serde_json::from_str(&content).map_err(|source| FocusError::CalibrationFormat {
            path: path.to_path_buf(),
            source,
        })?;
    stats.validate()?;
    debug!(
        path = %path.display(),
        patch_mode = stats.patch_mode,
        samples = stats.total_samples,
        "loaded calibration"
    );
    Ok(stats)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::calibration::AlgorithmStats;
    use tempfile::TempDir;

    fn sample_stats() -> CalibrationStats {
        let s = |p5: f64, p95: f64| AlgorithmStats {
            p5,
            p95,
            median: (p5 + p95) / 2.0,
            min: p5 / 2.0,
            max: p95 * 2.0,
        };
        CalibrationStats::new(
            s(12.5, 890.25),
            s(3.1, 42.0),
            s(1500.0, 2.5e6),
            s(180.0, 3100.0),
            20,
            1280,
            true,
        )
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("calibration.json");
        let stats = sample_stats();

        save_stats(&stats, &path).unwrap();
        let loaded = load_stats(&path).unwrap();

        assert_eq!(loaded, stats);
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let json = to_json(&sample_stats()).unwrap();
        assert!(json.contains("\"sampleSize\": 20"));
        assert!(json.contains("\"patchMode\": true"));
        assert!(json.contains("\"totalSamples\": 1280"));
        assert!(json.contains("\"version\": \"1.0\""));
        assert!(json.contains("\"p95\""));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_stats(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FocusError::CalibrationIo { .. }));
        assert!(err.is_calibration());
    }

    #[test]
    fn test_malformed_file_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{\"laplacian\": 1}").unwrap();
        let err = load_stats(&path).unwrap_err();
        assert!(matches!(err, FocusError::CalibrationFormat { .. }));
    }

    #[test]
    fn test_inverted_window_rejected_on_load() {
        let mut stats = sample_stats();
        stats.gradient.p95 = 1.0;
        let json = serde_json::to_string(&stats).unwrap();
        assert!(matches!(from_json(&json), Err(FocusError::Calibration(_))));
    }
}
