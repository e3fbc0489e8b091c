//! Progress bar adapter using indicatif.

use focus_qa_core::{ProgressEvent, ProgressSink, ScoreOutcome};
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle};

/// Progress bar adapter for CLI output.
pub struct ProgressBar {
    bar: Option<IndicatifBar>,
    quiet: bool,
}

impl ProgressBar {
    /// Creates a new progress bar.
    ///
    /// # Arguments
    ///
    /// * `total` - Total number of items, if known
    /// * `quiet` - If true, suppress all output
    /// * `show_bar` - If true, show progress bar; otherwise show per-item status
    #[must_use]
    pub fn new(total: Option<u64>, quiet: bool, show_bar: bool) -> Self {
        if quiet {
            return Self {
                bar: None,
                quiet: true,
            };
        }

        let bar = if show_bar {
            let bar = total.map_or_else(IndicatifBar::new_spinner, IndicatifBar::new);

            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            ) {
                bar.set_style(style.progress_chars("#>-"));
            }

            Some(bar)
        } else {
            None
        };

        Self { bar, quiet }
    }
}

impl ProgressSink for ProgressBar {
    fn on_event(&self, event: ProgressEvent) {
        if self.quiet {
            return;
        }

        match event {
            ProgressEvent::Started { path, index, total } => {
                if let Some(bar) = &self.bar {
                    if let Some(t) = total {
                        bar.set_length(t as u64);
                    }
                    bar.set_position(index as u64);
                    bar.set_message(path);
                }
            }
            ProgressEvent::Completed { result } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                match &result.outcome {
                    ScoreOutcome::Scored(scored) if scored.is_blurry && self.bar.is_none() => {
                        eprintln!(
                            "{}: blurry (score {:.1} < {:.1})",
                            result.path, scored.score, result.threshold
                        );
                    }
                    ScoreOutcome::Error { message } => {
                        eprintln!("WARN: Failed to score {}: {message}", result.path);
                    }
                    ScoreOutcome::Scored(_) => {}
                }
            }
            ProgressEvent::Skipped { path, reason } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                }
                eprintln!("WARN: Skipping {path}: {reason}");
            }
            ProgressEvent::Sampled { path, data_points } => {
                if let Some(bar) = &self.bar {
                    bar.inc(1);
                    bar.set_message(format!("{path} ({data_points} samples)"));
                }
            }
            ProgressEvent::SamplingFinished { sampled, skipped } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!("Done: {sampled} sampled, {skipped} skipped"));
                }
            }
            ProgressEvent::Finished {
                scored,
                blurry,
                failed,
            } => {
                if let Some(bar) = &self.bar {
                    bar.finish_with_message(format!(
                        "Done: {scored} scored, {blurry} blurry, {failed} failed"
                    ));
                }
            }
        }
    }
}
