//! Calibrate command - derive normalization statistics from a corpus.

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use focus_qa_adapters::FsImageSource;
use focus_qa_core::calibration::{self, CalibrationMode, CalibrationSample, CalibrationStats};
use focus_qa_core::patch::{PatchGrid, DEFAULT_GRID_SIZE};
use focus_qa_core::{
    collect_calibration_inputs, compute_calibration, save_stats, ImageLoadError, ImageSource,
    ProgressEvent, ProgressSink,
};
use tracing::{info, warn};

use super::check::parse_grid_size;
use crate::config::AppConfig;
use crate::output::ProgressBar;

/// Arguments for building a calibration file.
#[derive(Args, Clone, Default)]
pub struct CalibrateArgs {
    /// Reference images or directories (ideally sharp, representative photos)
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Calibrate per patch (for the patch algorithm) instead of per image
    #[arg(long)]
    pub patch_mode: bool,

    /// Patches per axis in patch mode
    #[arg(long, value_parser = parse_grid_size)]
    pub grid_size: Option<u32>,

    /// Write the calibration here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CalibrateArgs {
    /// Apply configuration file values, respecting CLI precedence.
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }
        args.grid_size = args.grid_size.or(config.scoring.grid_size);
        args
    }

    const fn mode(&self) -> CalibrationMode {
        CalibrationMode::from_patch_flag(self.patch_mode)
    }
}

/// Run the calibrate command.
pub fn run(args: &CalibrateArgs) -> Result<()> {
    info!("Running calibrate command on {} paths", args.paths.len());

    let grid = PatchGrid::new(args.grid_size.unwrap_or(DEFAULT_GRID_SIZE))
        .context("Invalid grid size")?;

    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();
    let show_progress = !args.quiet && std::io::stderr().is_terminal();
    let progress = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let corpus = collect_corpus(&source, args.mode(), grid, &progress);
    let stats = compute_calibration(&corpus, args.mode())
        .context("Calibration failed; no usable reference images")?;

    match &args.output {
        Some(path) => {
            save_stats(&stats, path)
                .with_context(|| format!("Failed to write calibration: {}", path.display()))?;
            if !args.quiet {
                eprintln!(
                    "Calibrated on {} images ({} samples), written to {}",
                    stats.sample_size,
                    stats.total_samples,
                    path.display()
                );
            }
        }
        None => write_stdout(&stats)?,
    }

    Ok(())
}

/// Collect raw scores from every image, skipping those that fail.
fn collect_corpus(
    source: &dyn ImageSource,
    mode: CalibrationMode,
    grid: PatchGrid,
    progress: &dyn ProgressSink,
) -> Vec<CalibrationSample> {
    let total = source.count_hint();
    let mut corpus = Vec::new();
    let mut failed = 0usize;

    for (index, image_result) in source.images().enumerate() {
        let image = match image_result {
            Ok(image) => image,
            Err(e) => {
                let path = ImageLoadError::find(&e)
                    .map_or_else(|| format!("image {index}"), |load| load.path.clone());
                progress.on_event(ProgressEvent::Skipped {
                    path,
                    reason: format!("{e:#}"),
                });
                failed += 1;
                continue;
            }
        };

        progress.on_event(ProgressEvent::Started {
            path: image.path.clone(),
            index,
            total,
        });

        match collect_calibration_inputs(&image.image.view(), mode, grid) {
            Ok(sample) => {
                progress.on_event(ProgressEvent::Sampled {
                    path: image.path,
                    data_points: sample.len(),
                });
                corpus.push(sample);
            }
            Err(e) => {
                warn!("Skipping {} for calibration: {e}", image.path);
                progress.on_event(ProgressEvent::Skipped {
                    path: image.path,
                    reason: e.to_string(),
                });
                failed += 1;
            }
        }
    }

    progress.on_event(ProgressEvent::SamplingFinished {
        sampled: corpus.len(),
        skipped: failed,
    });
    info!("Collected {} calibration samples, {failed} skipped", corpus.len());

    corpus
}

fn write_stdout(stats: &CalibrationStats) -> Result<()> {
    let json = calibration::to_json(stats)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}")?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use focus_qa_test_support::{MockImageSource, MockProgressSink, SyntheticImageBuilder};

    fn corpus_source() -> MockImageSource {
        MockImageSource::new(vec![
            SyntheticImageBuilder::checkerboard(64, 64),
            SyntheticImageBuilder::vertical_bars(64, 64, 4),
            SyntheticImageBuilder::horizontal_gradient(64, 64),
        ])
        .with_failure("broken.png")
    }

    #[test]
    fn test_full_image_corpus() {
        let progress = MockProgressSink::new();
        let corpus = collect_corpus(
            &corpus_source(),
            CalibrationMode::FullImage,
            PatchGrid::default(),
            &progress,
        );

        assert_eq!(corpus.len(), 3);
        assert!(corpus.iter().all(|s| matches!(s, CalibrationSample::Image(_))));
        assert_eq!(progress.skipped_count(), 1);
        assert_eq!(progress.started_count(), 3);
        assert_eq!(progress.sampled_count(), 3);
        assert_eq!(progress.sampling_counts(), Some((3, 1)));
        assert!(!progress.has_finished());
    }

    #[test]
    fn test_patch_corpus_skips_small_images() {
        let source = MockImageSource::new(vec![
            SyntheticImageBuilder::checkerboard(64, 64),
            SyntheticImageBuilder::tiny([[0, 1], [2, 3]]),
        ]);
        let progress = MockProgressSink::new();
        let corpus = collect_corpus(
            &source,
            CalibrationMode::Patch,
            PatchGrid::new(4).unwrap(),
            &progress,
        );

        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus[0].len(), 16);
        assert_eq!(progress.skipped_count(), 1);
        assert_eq!(progress.sampling_counts(), Some((1, 1)));
        assert!(matches!(
            progress.events().iter().find(|e| matches!(e, ProgressEvent::Sampled { .. })),
            Some(ProgressEvent::Sampled { data_points: 16, .. })
        ));

        let stats = compute_calibration(&corpus, CalibrationMode::Patch).unwrap();
        assert!(stats.patch_mode);
        assert_eq!(stats.total_samples, 16);
    }

    #[test]
    fn test_with_config_grid_size() {
        let config: AppConfig = toml::from_str("[scoring]\ngrid_size = 5\n").unwrap();
        let args = CalibrateArgs::with_config(CalibrateArgs::default(), &config);
        assert_eq!(args.grid_size, Some(5));

        let explicit = CalibrateArgs {
            grid_size: Some(3),
            ..CalibrateArgs::default()
        };
        assert_eq!(
            CalibrateArgs::with_config(explicit, &config).grid_size,
            Some(3)
        );
    }
}
