//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, ValueEnum};
use serde::Deserialize;

/// Report how many code points the @font-face rules of a stylesheet cover,
/// per font family.
#[derive(Debug, Parser)]
#[command(name = "fontface-stats")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Stylesheets to analyze: files, directories, `-` for stdin, or http(s) URLs
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// Fetch a family from the Google Fonts CSS2 API (repeatable)
    #[arg(long = "google-font", value_name = "FAMILY")]
    pub google_fonts: Vec<String>,

    /// Output format
    #[arg(long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Glob patterns to ignore when walking directories
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Path to a fontface-stats.json configuration file
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// User agent sent with HTTP requests
    #[arg(long = "user-agent")]
    pub user_agent: Option<String>,

    /// Stop at the first input that fails
    #[arg(long = "fail-fast")]
    pub fail_fast: bool,

    /// Raise the log level (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// Human-readable with source snippets for failures
    HumanVerbose,
    /// JSON output
    Json,
    /// Machine-readable (one line per family or failure)
    Machine,
}

impl Args {
    /// Returns the default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
