//! CLI definition and dispatch

mod watch;

pub use watch::WatchOptions;

use anyhow::Result;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Parse and validate a debounce period in milliseconds (1-60000)
fn parse_debounce(s: &str) -> Result<u64, String> {
    let n: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("debounce must be at least 1 ms".to_string())
    } else if n > 60_000 {
        Err("debounce cannot exceed 60000 ms".to_string())
    } else {
        Ok(n)
    }
}

/// quality-watch - live code-quality feedback
///
/// Re-scores Python, JavaScript and TypeScript files against quality rules
/// every time they are saved.
#[derive(Parser, Debug)]
#[command(name = "quality-watch")]
#[command(
    version,
    about = "Live code-quality watcher: re-scores source files against quality rules as they change",
    after_help = "\
Examples:
  quality-watch                               Watch the current directory
  quality-watch --watch src,lib --verbose     Watch two trees, show every violation
  quality-watch --config rules.json           Use a custom rules document
  quality-watch --notifications false         Log only, no notification requests
  quality-watch --debounce 1000               Wait one second of quiet before analyzing"
)]
pub struct Cli {
    /// Paths to watch (comma-separated)
    #[arg(long, short = 'w', value_delimiter = ',', default_value = ".")]
    pub watch: Vec<PathBuf>,

    /// Rules document (JSON)
    #[arg(long, short = 'c', default_value = crate::config::DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Emit notification requests for files with violations
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    pub notifications: bool,

    /// Log every violation with its suggestion
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Quiet period in milliseconds before a changed file is analyzed
    #[arg(long, default_value = "500", value_parser = parse_debounce)]
    pub debounce: u64,

    /// Where to write the status artifact (relative to the working directory)
    #[arg(long, default_value = crate::reporters::STATUS_FILE)]
    pub status_file: PathBuf,

    /// Extra directory names to ignore
    #[arg(long, value_delimiter = ',')]
    pub ignore_dir: Vec<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Plain-text output without emoji
    #[arg(long)]
    pub no_emoji: bool,
}

impl Cli {
    /// Filter directive for the log subscriber. `--verbose` raises this
    /// crate to debug and leaves dependencies at info.
    pub fn log_filter(&self) -> &str {
        if self.verbose {
            "quality_watch=debug,info"
        } else {
            &self.log_level
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let options = WatchOptions::from_cli(&cli)?;
    // single-threaded loop; analysis runs on the blocking pool
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch::run(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["quality-watch"]).unwrap();
        assert_eq!(cli.watch, vec![PathBuf::from(".")]);
        assert_eq!(cli.config, PathBuf::from("quality-config.json"));
        assert!(cli.notifications);
        assert!(!cli.verbose);
        assert_eq!(cli.debounce, 500);
        assert_eq!(cli.status_file, PathBuf::from(".quality-status.json"));
        assert_eq!(cli.log_filter(), "info");
    }

    #[test]
    fn test_watch_paths_are_comma_separated() {
        let cli = Cli::try_parse_from(["quality-watch", "--watch", "src,lib"]).unwrap();
        assert_eq!(cli.watch, vec![PathBuf::from("src"), PathBuf::from("lib")]);
    }

    #[test]
    fn test_notifications_toggle() {
        let cli = Cli::try_parse_from(["quality-watch", "--notifications", "false"]).unwrap();
        assert!(!cli.notifications);
    }

    #[test]
    fn test_verbose_raises_log_level() {
        let cli = Cli::try_parse_from(["quality-watch", "--verbose", "--log-level", "warn"]).unwrap();
        assert_eq!(cli.log_filter(), "quality_watch=debug,info");
        assert!(tracing_subscriber::EnvFilter::try_new(cli.log_filter()).is_ok());
    }

    #[test]
    fn test_debounce_validation() {
        assert!(Cli::try_parse_from(["quality-watch", "--debounce", "0"]).is_err());
        assert!(Cli::try_parse_from(["quality-watch", "--debounce", "abc"]).is_err());
        let cli = Cli::try_parse_from(["quality-watch", "--debounce", "1000"]).unwrap();
        assert_eq!(cli.debounce, 1000);
    }
}
