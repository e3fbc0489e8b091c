//! Configuration file support for focus-qa.
//!
//! Supports TOML configuration from:
//! - XDG config: `~/.config/focus-qa/config.toml` (lowest priority)
//! - Project-local: `.focus-qa.toml` (searched up directory tree)
//! - CLI flags (highest priority, applied separately)

use std::path::{Path, PathBuf};

use focus_qa_core::{AlgorithmKind, Strategy};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General options.
    pub general: GeneralConfig,
    /// Scoring settings.
    pub scoring: ScoringConfig,
    /// Output formatting settings.
    pub output: OutputConfig,
}

/// General configuration options.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Recurse into subdirectories by default.
    pub recursive: Option<bool>,
}

/// Scoring configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Algorithm: "composite" or "patch".
    pub algorithm: Option<String>,
    /// Patch strategy name, e.g. "peak-focus".
    pub strategy: Option<String>,
    /// Blurry threshold (0-100).
    pub threshold: Option<f64>,
    /// Patches per axis.
    pub grid_size: Option<u32>,
    /// Calibration file path.
    pub calibration: Option<PathBuf>,
}

/// Output formatting configuration.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json" or "jsonl".
    pub format: Option<String>,
    /// Pretty-print JSON output.
    pub pretty: Option<bool>,
    /// Show progress bar.
    pub progress: Option<bool>,
}

impl AppConfig {
    /// Load configuration from XDG and project-local files.
    ///
    /// Priority (lowest to highest):
    /// 1. XDG config: `~/.config/focus-qa/config.toml`
    /// 2. Project-local: `.focus-qa.toml` (searched up from cwd)
    ///
    /// Missing files are silently ignored. Invalid values are logged as
    /// warnings and dropped.
    pub fn load() -> Self {
        let mut config = Self::default();

        // Load XDG config (lowest priority)
        if let Some(xdg_path) = xdg_config_path() {
            if xdg_path.exists() {
                info!("Loading XDG config: {}", xdg_path.display());
                if let Some(xdg_config) = load_file(&xdg_path) {
                    config = xdg_config;
                }
            } else {
                debug!("XDG config not found: {}", xdg_path.display());
            }
        }

        // Load project-local config (higher priority, merged)
        if let Some(project_path) = find_project_config() {
            info!("Loading project config: {}", project_path.display());
            if let Some(project_config) = load_file(&project_path) {
                config.merge(project_config);
            }
        }

        for problem in config.sanitize() {
            eprintln!("warning: {problem}");
        }

        config
    }

    /// Validate configuration values, describing each invalid one by its
    /// config key.
    fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if let Some(t) = self.scoring.threshold {
            if !(0.0..=100.0).contains(&t) {
                problems.push(format!("scoring.threshold must be 0-100, got {t}"));
            }
        }
        if self.scoring.grid_size == Some(0) {
            problems.push("scoring.grid_size must be positive, got 0".to_string());
        }
        if let Some(ref a) = self.scoring.algorithm {
            if a.parse::<AlgorithmKind>().is_err() {
                problems.push(format!(
                    "scoring.algorithm must be 'composite' or 'patch', got '{a}'"
                ));
            }
        }
        if let Some(ref s) = self.scoring.strategy {
            if s.parse::<Strategy>().is_err() {
                problems.push(format!("scoring.strategy is not a known strategy: '{s}'"));
            }
        }
        if let Some(ref f) = self.output.format {
            if f != "json" && f != "jsonl" {
                problems.push(format!(
                    "output.format must be 'json' or 'jsonl', got '{f}'"
                ));
            }
        }

        problems
    }

    /// Drops invalid values so they fall back to the next layer, returning
    /// what was dropped.
    fn sanitize(&mut self) -> Vec<String> {
        let problems = self.problems();
        if problems.is_empty() {
            return problems;
        }

        if self
            .scoring
            .threshold
            .is_some_and(|t| !(0.0..=100.0).contains(&t))
        {
            self.scoring.threshold = None;
        }
        if self.scoring.grid_size == Some(0) {
            self.scoring.grid_size = None;
        }
        if self
            .scoring
            .algorithm
            .as_deref()
            .is_some_and(|a| a.parse::<AlgorithmKind>().is_err())
        {
            self.scoring.algorithm = None;
        }
        if self
            .scoring
            .strategy
            .as_deref()
            .is_some_and(|s| s.parse::<Strategy>().is_err())
        {
            self.scoring.strategy = None;
        }
        if self
            .output
            .format
            .as_deref()
            .is_some_and(|f| f != "json" && f != "jsonl")
        {
            self.output.format = None;
        }

        problems
    }

    /// Anchors relative file paths at `base`, the directory of the config
    /// file they were read from.
    fn resolve_paths(&mut self, base: &Path) {
        if let Some(calibration) = &mut self.scoring.calibration {
            if calibration.is_relative() {
                *calibration = base.join(&*calibration);
            }
        }
    }

    /// Merge another config into this one.
    /// Values from `other` override values in `self` when present.
    fn merge(&mut self, other: Self) {
        // General
        self.general.recursive = other.general.recursive.or(self.general.recursive);

        // Scoring
        self.scoring.algorithm = other
            .scoring
            .algorithm
            .or_else(|| self.scoring.algorithm.take());
        self.scoring.strategy = other
            .scoring
            .strategy
            .or_else(|| self.scoring.strategy.take());
        self.scoring.threshold = other.scoring.threshold.or(self.scoring.threshold);
        self.scoring.grid_size = other.scoring.grid_size.or(self.scoring.grid_size);
        self.scoring.calibration = other
            .scoring
            .calibration
            .or_else(|| self.scoring.calibration.take());

        // Output
        self.output.format = other.output.format.or_else(|| self.output.format.take());
        self.output.pretty = other.output.pretty.or(self.output.pretty);
        self.output.progress = other.output.progress.or(self.output.progress);
    }
}

/// Get the XDG config file path.
fn xdg_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("focus-qa").join("config.toml"))
}

/// Find project-local config by searching up from current directory.
fn find_project_config() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    find_config_in_parents(&cwd)
}

/// Search for `.focus-qa.toml` in the given directory and its parents.
fn find_config_in_parents(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);

    while let Some(dir) = current {
        let config_path = dir.join(".focus-qa.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        current = dir.parent();
    }

    None
}

/// Load and parse a TOML config file.
fn load_file(path: &Path) -> Option<AppConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(mut config) => {
            if let Some(dir) = path.parent() {
                config.resolve_paths(dir);
            }
            Some(config)
        }
        Err(e) => {
            warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.scoring.threshold.is_none());
        assert!(config.scoring.algorithm.is_none());
        assert!(config.output.format.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: AppConfig = toml::from_str("").expect("parse empty config");
        assert!(config.general.recursive.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r"
[general]
recursive = true

[scoring]
algorithm = 'patch'
strategy = 'subject-focus-strict'
threshold = 42.5
grid_size = 6
calibration = '/tmp/calibration.json'

[output]
format = 'json'
pretty = true
progress = false
";
        let config: AppConfig = toml::from_str(toml).expect("parse full config");

        assert_eq!(config.general.recursive, Some(true));
        assert_eq!(config.scoring.algorithm.as_deref(), Some("patch"));
        assert_eq!(
            config.scoring.strategy.as_deref(),
            Some("subject-focus-strict")
        );
        assert_eq!(config.scoring.threshold, Some(42.5));
        assert_eq!(config.scoring.grid_size, Some(6));
        assert_eq!(
            config.scoring.calibration,
            Some(PathBuf::from("/tmp/calibration.json"))
        );
        assert_eq!(config.output.format, Some("json".to_string()));
        assert_eq!(config.output.pretty, Some(true));
        assert!(config.problems().is_empty());
    }

    #[test]
    fn test_merge_configs() {
        let mut base: AppConfig = toml::from_str(
            r"
[scoring]
threshold = 30.0
grid_size = 4

[output]
format = 'json'
",
        )
        .expect("parse base");

        let override_config: AppConfig = toml::from_str(
            r"
[scoring]
threshold = 55.0
strategy = 'peak-focus'
",
        )
        .expect("parse override");

        base.merge(override_config);

        // Overridden
        assert_eq!(base.scoring.threshold, Some(55.0));
        // Preserved from base
        assert_eq!(base.scoring.grid_size, Some(4));
        assert_eq!(base.output.format, Some("json".to_string()));
        // Added from override
        assert_eq!(base.scoring.strategy.as_deref(), Some("peak-focus"));
    }

    #[test]
    fn test_merge_empty_override_preserves_base() {
        let mut base: AppConfig = toml::from_str(
            r"
[scoring]
calibration = 'cal.json'
",
        )
        .expect("parse base");

        base.merge(AppConfig::default());

        assert_eq!(base.scoring.calibration, Some(PathBuf::from("cal.json")));
    }

    #[test]
    fn test_partial_output_config() {
        let config: AppConfig = toml::from_str(
            r"
[output]
pretty = true
",
        )
        .expect("parse partial output");

        assert_eq!(config.output.pretty, Some(true));
        assert!(config.output.format.is_none());
        assert!(config.output.progress.is_none());
    }

    #[test]
    fn test_invalid_toml_syntax_handled() {
        let toml = r"
[scoring
threshold = 50.0
";
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "invalid TOML should return error");
    }

    #[test]
    fn test_invalid_field_type_handled() {
        let toml = r#"
[scoring]
threshold = "high"
"#;
        let result: Result<AppConfig, _> = toml::from_str(toml);
        assert!(result.is_err(), "type mismatch should return error");
    }

    #[test]
    fn test_relative_calibration_resolved_against_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".focus-qa.toml");
        std::fs::write(&path, "[scoring]\ncalibration = 'cal/ref.json'\n").unwrap();

        let config = load_file(&path).unwrap();
        assert_eq!(
            config.scoring.calibration,
            Some(dir.path().join("cal").join("ref.json"))
        );
    }

    #[test]
    fn test_absolute_calibration_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("elsewhere.json");
        let mut config = AppConfig::default();
        config.scoring.calibration = Some(absolute.clone());

        config.resolve_paths(Path::new("/some/project"));
        assert_eq!(config.scoring.calibration, Some(absolute));
    }

    #[test]
    fn test_find_config_in_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".focus-qa.toml"), "").unwrap();

        let found = find_config_in_parents(&nested).unwrap();
        assert_eq!(found, dir.path().join(".focus-qa.toml"));
    }

    // === Validation Tests ===

    #[test]
    fn test_validate_threshold_out_of_range() {
        let mut config = AppConfig::default();
        config.scoring.threshold = Some(150.0);

        assert!(config.problems()[0].contains("scoring.threshold"));
    }

    #[test]
    fn test_validate_grid_size_zero() {
        let mut config = AppConfig::default();
        config.scoring.grid_size = Some(0);

        assert!(config.problems()[0].contains("scoring.grid_size"));
    }

    #[test]
    fn test_validate_unknown_names() {
        let mut config = AppConfig::default();
        config.scoring.algorithm = Some("neural".to_string());
        assert!(config.problems()[0].contains("scoring.algorithm"));

        let mut config = AppConfig::default();
        config.scoring.strategy = Some("min-focus".to_string());
        assert!(config.problems()[0].contains("scoring.strategy"));
    }

    #[test]
    fn test_validate_output_format_invalid() {
        let mut config = AppConfig::default();
        config.output.format = Some("xml".to_string());

        assert!(config.problems()[0].contains("output.format"));
    }

    #[test]
    fn test_sanitize_drops_only_invalid_values() {
        let mut config: AppConfig = toml::from_str(
            r"
[scoring]
threshold = -5.0
grid_size = 4
strategy = 'bogus'

[output]
format = 'jsonl'
",
        )
        .expect("parse");

        let problems = config.sanitize();

        assert_eq!(problems.len(), 2);
        assert!(config.scoring.threshold.is_none());
        assert!(config.scoring.strategy.is_none());
        assert_eq!(config.scoring.grid_size, Some(4));
        assert_eq!(config.output.format.as_deref(), Some("jsonl"));
        assert!(config.problems().is_empty());
    }

    #[test]
    fn test_validate_empty_config_passes() {
        assert!(AppConfig::default().problems().is_empty());
    }
}
