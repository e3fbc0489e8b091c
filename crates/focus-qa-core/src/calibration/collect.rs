//! Gathering raw scores from calibration images.

use super::CalibrationMode;
use crate::domain::{GrayView, RawScores};
use crate::error::Result;
use crate::measures::measure_all;
use crate::patch::{PatchAnalyzer, PatchGrid};

/// Raw kernel output contributed by one calibration image.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationSample {
    /// Whole-image scores.
    Image(RawScores),
    /// Per-patch scores, row-major.
    Patches(Vec<RawScores>),
}

impl CalibrationSample {
    /// Number of data points this sample contributes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Image(_) => 1,
            Self::Patches(scores) => scores.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Runs the focus kernels over one image in the shape `mode` expects.
///
/// # Errors
///
/// Propagates kernel failures, including images smaller than the grid in
/// patch mode.
pub fn collect_calibration_inputs(
    view: &GrayView<'_>,
    mode: CalibrationMode,
    grid: PatchGrid,
) -> Result<CalibrationSample> {
    match mode {
        CalibrationMode::FullImage => measure_all(view).map(CalibrationSample::Image),
        CalibrationMode::Patch => PatchAnalyzer::new(grid, None)
            .raw_scores(view)
            .map(CalibrationSample::Patches),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::GrayscaleImage;
    use crate::error::FocusError;

    fn bars() -> GrayscaleImage {
        GrayscaleImage::from_fn(64, 64, |x, _| if (x / 4) % 2 == 0 { 200 } else { 40 })
    }

    #[test]
    fn test_full_image_mode_yields_one_point() {
        let img = bars();
        let sample =
            collect_calibration_inputs(&img.view(), CalibrationMode::FullImage, PatchGrid::default())
                .unwrap();
        assert_eq!(sample.len(), 1);
        assert_eq!(sample, CalibrationSample::Image(measure_all(&img.view()).unwrap()));
    }

    #[test]
    fn test_patch_mode_yields_grid_points() {
        let img = bars();
        let sample = collect_calibration_inputs(
            &img.view(),
            CalibrationMode::Patch,
            PatchGrid::new(4).unwrap(),
        )
        .unwrap();
        assert_eq!(sample.len(), 16);
        assert!(matches!(sample, CalibrationSample::Patches(_)));
    }

    #[test]
    fn test_patch_mode_rejects_tiny_image() {
        let img = GrayscaleImage::from_fn(3, 3, |_, _| 0);
        let err = collect_calibration_inputs(&img.view(), CalibrationMode::Patch, PatchGrid::default())
            .unwrap_err();
        assert!(matches!(err, FocusError::Kernel(_)));
    }
}
