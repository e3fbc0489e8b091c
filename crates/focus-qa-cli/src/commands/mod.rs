//! CLI command definitions and handlers.

pub mod calibrate;
pub mod check;

use clap::{Parser, Subcommand};

/// Focus QA - Blur scoring for photo collections
#[derive(Parser)]
#[command(name = "focus-qa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Shared check arguments (paths, scoring and output flags).
    #[command(flatten)]
    pub check: check::CheckArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Score images for blur
    Check(check::CheckArgs),
    /// Build a calibration file from a reference corpus
    Calibrate(calibrate::CalibrateArgs),
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// No blurry images found.
    Success = 0,
    /// At least one image was judged blurry.
    BlurryFound = 1,
    /// Configuration, calibration or I/O failure.
    Error = 2,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}
