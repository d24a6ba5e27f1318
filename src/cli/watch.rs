//! `quality-watch` session: live re-scoring on file changes
//!
//! Loads the rules document, starts the filesystem watcher and drives the
//! pipeline until Ctrl+C (or SIGTERM on unix).

use anyhow::{Context, Result};
use console::style;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::Cli;
use crate::config::{load_quality_config, QualityConfig};
use crate::pipeline::Pipeline;
use crate::reporters::{LogNotifier, ReportGenerator};
use crate::rules::ViolationEngine;
use crate::source::FsReader;
use crate::tracker::ViolationTracker;
use crate::watch::{ChangeDebouncer, FsWatcher, PathFilter};

/// Everything a watch session needs, resolved from the command line
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Working root; status paths are shown relative to it
    pub root: PathBuf,
    pub roots: Vec<PathBuf>,
    pub config: QualityConfig,
    pub debounce: Duration,
    pub notifications: bool,
    pub status_path: PathBuf,
    pub ignored_dirs: Vec<String>,
    pub verbose: bool,
    pub no_emoji: bool,
}

impl WatchOptions {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let root = std::env::current_dir().context("cannot determine working directory")?;
        let roots = cli
            .watch
            .iter()
            .map(|p| {
                std::fs::canonicalize(root.join(p))
                    .with_context(|| format!("cannot watch {}", p.display()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            config: load_quality_config(&root.join(&cli.config)),
            status_path: root.join(&cli.status_file),
            root,
            roots,
            debounce: Duration::from_millis(cli.debounce),
            notifications: cli.notifications,
            ignored_dirs: cli.ignore_dir.clone(),
            verbose: cli.verbose,
            no_emoji: cli.no_emoji,
        })
    }

    /// Notification requests are sent only when both the flag and the
    /// rules document allow them
    pub fn real_time_feedback(&self) -> bool {
        self.notifications && self.config.enforcement.real_time_feedback
    }
}

pub async fn run(options: WatchOptions) -> Result<()> {
    print_banner(&options);

    let mut reports = ReportGenerator::new(&options.root).with_status_file(&options.status_path);
    if options.real_time_feedback() {
        reports = reports.with_notifier(Box::new(LogNotifier));
    }

    let engine = ViolationEngine::new(options.config.rules.clone())
        .with_enforcement(options.config.enforcement.level);
    let pipeline = Pipeline::new(engine, Arc::new(FsReader), reports)
        .verbose(options.verbose)
        .no_emoji(options.no_emoji);

    let (tx, rx) = mpsc::unbounded_channel();
    let filter = PathFilter::new(&options.roots).with_ignored_dirs(options.ignored_dirs.iter().cloned());
    let watcher = FsWatcher::start(&options.roots, filter, tx)?;

    let mut debouncer = ChangeDebouncer::new(options.debounce);
    let mut tracker = ViolationTracker::new();

    let outcome = pipeline
        .run(&mut debouncer, &mut tracker, rx, shutdown_signal())
        .await;

    // release timers and watch handles before reporting
    debouncer.cancel_all();
    drop(watcher);

    let aggregate = tracker.aggregate();
    info!(
        files = aggregate.total_files,
        with_violations = aggregate.files_with_violations,
        violations = aggregate.total_violations,
        score = aggregate.quality_score,
        "Watch session ended"
    );
    println!(
        "\n{}Quality score {} ({} violations in {} of {} files)",
        if options.no_emoji { "" } else { "📊 " },
        style(aggregate.quality_score).bold(),
        aggregate.total_violations,
        aggregate.files_with_violations,
        aggregate.total_files
    );

    outcome
}

/// Resolves on Ctrl+C, or on SIGTERM where the platform has it
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => debug!("Received Ctrl+C"),
        _ = terminate() => debug!("Received SIGTERM"),
    }
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}

fn print_banner(options: &WatchOptions) {
    let icon = if options.no_emoji { "" } else { "🛡️  " };
    for root in &options.roots {
        println!(
            "\n{}Watching {} for changes...",
            style(icon).bold(),
            style(root.display()).cyan()
        );
    }
    let rules = &options.config.rules;
    println!(
        "  {} max {} lines/file, {} lines/function, complexity {}",
        style("→").dim(),
        rules.max_file_lines,
        rules.max_function_lines,
        rules.max_complexity
    );
    println!("  {} Save a file to trigger analysis", style("→").dim());
    println!("  {} Press Ctrl+C to stop\n", style("→").dim());
}
