//! Main orchestration logic.

use crate::cli::Args;
use crate::config::{Config, ConfigError, Settings};
use crate::output::{Formatter, InputFailure, InputReport, RunSummary};
use crate::source::{build_ignore_set, resolve_sources, Loader, Source, SourceError};
use camino::Utf8PathBuf;
use fontface_analyzer::analyze;
use miette::Diagnostic;
use rayon::prelude::*;
use std::io::{self, Write};
use thiserror::Error;
use tracing::{debug, info};

/// Orchestration errors. These abort the run; per-input problems are
/// reported in the output instead.
#[derive(Debug, Error, Diagnostic)]
pub enum OrchestratorError {
    /// The configuration file is unusable.
    #[error(transparent)]
    #[diagnostic(code(fontface_stats::config))]
    Config(#[from] ConfigError),

    /// Inputs could not be resolved.
    #[error(transparent)]
    #[diagnostic(code(fontface_stats::input))]
    Source(#[from] SourceError),

    /// Results could not be written to stdout.
    #[error("failed to write results")]
    #[diagnostic(code(fontface_stats::output))]
    Output(#[source] io::Error),

    /// Nothing to analyze.
    #[error("no inputs given")]
    #[diagnostic(
        code(fontface_stats::no_inputs),
        help("pass stylesheet paths, `-` for stdin, URLs, or --google-font <FAMILY>")
    )]
    NoInputs,
}

/// Runs the analysis on all inputs and prints the results.
pub async fn run(args: Args) -> Result<RunSummary, OrchestratorError> {
    let config = load_config(&args)?;
    let settings = Settings::resolve(&args, config)?;

    let ignore = build_ignore_set(&settings.ignore)?;
    let sources = resolve_sources(&args.inputs, &args.google_fonts, &settings, &ignore)?;
    if sources.is_empty() {
        return Err(OrchestratorError::NoInputs);
    }
    info!(inputs = sources.len(), "resolved inputs");

    let loader = Loader::new(&settings.user_agent)?;
    let reports = if settings.fail_fast {
        run_fail_fast(&loader, sources).await
    } else {
        let loaded = loader.load_all(sources).await;
        loaded
            .into_par_iter()
            .map(|(source, text)| analyze_input(&source, text))
            .collect()
    };

    let formatter = Formatter::new(settings.output);
    let summary = RunSummary::from_reports(&reports);
    write_output(&mut io::stdout().lock(), &formatter, &reports, &summary)
        .map_err(OrchestratorError::Output)?;

    Ok(summary)
}

/// Writes the formatted reports, then the summary line for human formats.
fn write_output(
    out: &mut impl Write,
    formatter: &Formatter,
    reports: &[InputReport],
    summary: &RunSummary,
) -> io::Result<()> {
    out.write_all(formatter.format(reports).as_bytes())?;
    if formatter.shows_summary() {
        writeln!(out, "{}", summary.format())?;
    }
    out.flush()
}

/// Loads and analyzes inputs one at a time, stopping after the first failure.
async fn run_fail_fast(loader: &Loader, sources: Vec<Source>) -> Vec<InputReport> {
    let mut reports = Vec::with_capacity(sources.len());
    for source in sources {
        let text = loader.load(&source).await;
        let report = analyze_input(&source, text);
        let failed = report.is_failure();
        reports.push(report);
        if failed {
            debug!("stopping at first failure");
            break;
        }
    }
    reports
}

/// Turns one loaded input into a report.
pub fn analyze_input(source: &Source, text: Result<String, SourceError>) -> InputReport {
    let outcome = match text {
        Ok(text) => analyze(&text).map_err(|error| {
            debug!(source = %source, %error, "analysis failed");
            InputFailure::from_analyze_error(&error, &text)
        }),
        Err(error) => Err(InputFailure::new(error.to_string())),
    };

    InputReport {
        source: source.to_string(),
        outcome,
    }
}

fn load_config(args: &Args) -> Result<Config, ConfigError> {
    if let Some(path) = &args.config {
        return Config::load(path);
    }

    let Ok(cwd) = std::env::current_dir() else {
        return Ok(Config::default());
    };
    let Ok(cwd) = Utf8PathBuf::try_from(cwd) else {
        return Ok(Config::default());
    };
    match Config::find(&cwd)? {
        Some((path, config)) => {
            debug!(path = %path, "loaded configuration");
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}
