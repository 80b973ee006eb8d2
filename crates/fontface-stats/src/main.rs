//! fontface-stats: unicode-range coverage of @font-face rules, per family.

mod cli;
mod config;
mod line_index;
mod orchestrator;
mod output;
mod source;

use clap::Parser;
use cli::Args;
use miette::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_level());

    let summary = orchestrator::run(args).await?;
    if summary.failed_count > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Logs to stderr. `RUST_LOG` takes precedence over the -v flags.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
