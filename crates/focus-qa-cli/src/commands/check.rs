//! Check command - score images for blur.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use focus_qa_adapters::FsImageSource;
use focus_qa_core::engine::{BlurEngine, EngineConfig};
use focus_qa_core::patch::DEFAULT_GRID_SIZE;
use focus_qa_core::{
    load_stats, Algorithm, ImageLoadError, ImageSource, PerImageResult, ProgressEvent,
    ProgressSink, ResultOutput, ScoreOutcome, Strategy,
};
use tracing::{debug, info};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{JsonOutput, OutputFormat, ProgressBar};

/// Scoring algorithm selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    /// Whole-image composite score
    Composite,
    /// Patch grid collapsed by a strategy
    Patch,
}

/// Parse and validate a threshold value (0-100).
pub fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0..=100"))
    }
}

/// Parse a patch strategy name.
fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse().map_err(|_| {
        let names: Vec<&str> = Strategy::ALL.iter().map(Strategy::name).collect();
        format!("unknown strategy '{s}' (expected one of: {})", names.join(", "))
    })
}

/// Parse a positive grid size.
pub fn parse_grid_size(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) => Err("grid size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{s}' is not a valid grid size")),
    }
}

/// Shared arguments for image scoring.
#[derive(Args, Clone, Default)]
pub struct CheckArgs {
    /// Files or directories to score
    pub paths: Vec<PathBuf>,

    /// Recurse into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Scoring algorithm
    #[arg(long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,

    /// Patch aggregation strategy (implies --algorithm patch)
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<Strategy>,

    /// Blurry threshold (0-100); defaults depend on algorithm and calibration
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Patches per axis for patch scoring
    #[arg(long, value_parser = parse_grid_size)]
    pub grid_size: Option<u32>,

    /// Calibration file produced by `focus-qa calibrate`
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Show progress bar
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print JSON output (only affects --format json)
    #[arg(long)]
    pub pretty: bool,
}

impl CheckArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    #[must_use]
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        // Recursive: config applies only if CLI --recursive not passed
        if !args.recursive {
            args.recursive = config.general.recursive.unwrap_or(false);
        }

        // Scoring: CLI > config (config values were validated on load)
        if args.algorithm.is_none() {
            args.algorithm = config
                .scoring
                .algorithm
                .as_deref()
                .and_then(|s| AlgorithmArg::from_str(s, true).ok());
        }
        if args.strategy.is_none() {
            args.strategy = config
                .scoring
                .strategy
                .as_deref()
                .and_then(|s| s.parse().ok());
        }
        args.threshold = args.threshold.or(config.scoring.threshold);
        args.grid_size = args.grid_size.or(config.scoring.grid_size);
        if args.calibration.is_none() {
            args.calibration.clone_from(&config.scoring.calibration);
        }

        // Output format: CLI > config (accessor provides fallback)
        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_deref()
                .and_then(OutputFormat::from_name);
        }

        // Boolean output options: CLI flag wins, then config
        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Resolve the scoring algorithm.
    ///
    /// An explicit `composite` wins over a strategy; otherwise a strategy
    /// selects patch scoring, and patch scoring without a strategy uses
    /// the default strategy.
    pub fn algorithm(&self) -> Algorithm {
        match (self.algorithm, self.strategy) {
            (Some(AlgorithmArg::Composite), Some(strategy)) => {
                debug!("Ignoring strategy {strategy} for composite scoring");
                Algorithm::Composite
            }
            (Some(AlgorithmArg::Composite), None) | (None, None) => Algorithm::Composite,
            (Some(AlgorithmArg::Patch) | None, strategy) => {
                Algorithm::Patch(strategy.unwrap_or_default())
            }
        }
    }

    /// Get grid size with fallback to hardcoded default.
    fn grid_size(&self) -> u32 {
        self.grid_size.unwrap_or(DEFAULT_GRID_SIZE)
    }

    /// Get output format with fallback to JSONL.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// Build the scoring engine, loading the calibration file if set.
    pub fn engine(&self) -> Result<BlurEngine> {
        let calibration = match &self.calibration {
            Some(path) => {
                let stats = load_stats(path)
                    .with_context(|| format!("Failed to load calibration: {}", path.display()))?;
                info!(
                    "Loaded {} calibration from {} ({} samples)",
                    if stats.patch_mode { "patch-mode" } else { "full-image" },
                    path.display(),
                    stats.total_samples
                );
                Some(Arc::new(stats))
            }
            None => None,
        };

        BlurEngine::new(EngineConfig {
            algorithm: self.algorithm(),
            threshold: self.threshold,
            grid_size: self.grid_size(),
            calibration,
        })
        .context("Invalid scoring configuration")
    }
}

/// Result of running the check command.
#[derive(Debug)]
#[allow(dead_code)] // Counts exposed for programmatic use
pub struct CheckResult {
    /// Number of images scored.
    pub scored: usize,
    /// Number of images judged blurry.
    pub blurry: usize,
    /// Number of images that failed to load or score.
    pub failed: usize,
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the check command.
///
/// Expects `args` to have been processed through `with_config()` first
/// to apply configuration file settings.
pub fn run(args: &CheckArgs) -> Result<CheckResult> {
    info!("Running check command on {} paths", args.paths.len());

    if args.paths.is_empty() {
        anyhow::bail!("No paths specified");
    }

    let engine = args.engine()?;
    debug!(
        "Scoring with {} (threshold {}, calibrated: {})",
        engine.algorithm(),
        engine.threshold(),
        engine.is_calibrated()
    );

    // Initialize image source
    let source = FsImageSource::new(args.paths.clone(), args.recursive);
    let total = source.count_hint();

    // Determine if we should show progress
    let show_progress = !args.quiet && (args.progress || std::io::stderr().is_terminal());
    let progress_bar = ProgressBar::new(total.map(|t| t as u64), args.quiet, show_progress);

    let output = JsonOutput::stdout(args.format(), args.pretty);

    process_images(&source, &engine, &output, &progress_bar)
}

/// Score every image from `source`, writing one result per image.
pub fn process_images(
    source: &dyn ImageSource,
    engine: &BlurEngine,
    output: &dyn ResultOutput,
    progress: &dyn ProgressSink,
) -> Result<CheckResult> {
    let total = source.count_hint();
    let mut scored = 0usize;
    let mut blurry = 0usize;
    let mut failed = 0usize;

    for (index, image_result) in source.images().enumerate() {
        let loaded = image_result.is_ok();
        let mut result = match image_result {
            Ok(image) => {
                progress.on_event(ProgressEvent::Started {
                    path: image.path.clone(),
                    index,
                    total,
                });
                engine.score(&image)
            }
            Err(e) => {
                let path = ImageLoadError::find(&e)
                    .map_or_else(|| format!("image {index}"), |load| load.path.clone());
                progress.on_event(ProgressEvent::Skipped {
                    path: path.clone(),
                    reason: format!("{e:#}"),
                });
                load_failure(engine, path, &e)
            }
        };
        result.timestamp = Some(iso_timestamp());

        match &result.outcome {
            ScoreOutcome::Scored(s) => {
                scored += 1;
                if s.is_blurry {
                    blurry += 1;
                }
            }
            ScoreOutcome::Error { .. } => failed += 1,
        }

        output.write(&result)?;
        // Load failures were already reported as skipped
        if loaded {
            progress.on_event(ProgressEvent::Completed { result });
        }
    }

    output.flush()?;

    progress.on_event(ProgressEvent::Finished {
        scored,
        blurry,
        failed,
    });
    info!("Scored {scored} images: {blurry} blurry, {failed} failed");

    // Determine exit code
    let exit_code = if blurry > 0 {
        ExitCode::BlurryFound
    } else {
        ExitCode::Success
    };

    Ok(CheckResult {
        scored,
        blurry,
        failed,
        exit_code,
    })
}

/// Error record for an image that could not be decoded.
fn load_failure(engine: &BlurEngine, path: String, error: &anyhow::Error) -> PerImageResult {
    let algorithm = engine.algorithm();
    PerImageResult {
        path,
        timestamp: None,
        algorithm: algorithm.kind(),
        strategy: algorithm.strategy(),
        calibrated: engine.is_calibrated(),
        threshold: engine.threshold(),
        outcome: ScoreOutcome::Error {
            message: format!("{error:#}"),
        },
    }
}

/// Generate ISO 8601 UTC timestamp (RFC 3339 format).
fn iso_timestamp() -> String {
    match time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339) {
        Ok(ts) => ts,
        Err(e) => {
            debug!("Timestamp format failed: {e}");
            String::from("1970-01-01T00:00:00Z")
        }
    }
}
