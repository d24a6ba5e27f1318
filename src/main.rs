//! quality-watch - live code-quality watcher
//!
//! Re-scores source files against quality rules as they change and keeps
//! a JSON status artifact up to date.

use anyhow::Result;
use clap::Parser;
use quality_watch::cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging (RUST_LOG wins over the CLI level)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    cli::run(cli)
}
