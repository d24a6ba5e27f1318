//! Watch pipeline
//!
//! Orchestrates one file change end to end:
//! 1. Debounce watcher events per path
//! 2. Read the file on a blocking task once the path is quiet
//! 3. Extract functions and metrics
//! 4. Score against the rule set
//! 5. Commit to the tracker, then report
//!
//! The loop runs on a single thread. Reads never block it: they run on the
//! blocking pool and their results come back as completions. The debouncer
//! and tracker are owned by the caller and passed in, so independent
//! pipelines never share state.

use crate::error::QualityError;
use crate::models::{ChangeKind, FileEvent, Severity, Trend, Violation};
use crate::parsers::{Language, StructuralAnalyzer};
use crate::reporters::ReportGenerator;
use crate::rules::{SiblingTestLookup, ViolationEngine};
use crate::source::SourceReader;
use crate::tracker::{Commit, Revision, ViolationTracker};
use crate::watch::{ChangeDebouncer, Trigger, WatchInput};
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Result of one analysis pass
struct Completion {
    path: PathBuf,
    kind: ChangeKind,
    revision: Revision,
    result: Result<Vec<Violation>, QualityError>,
}

/// Read, analyze and score one file
pub fn analyze_source(
    reader: &dyn SourceReader,
    analyzer: &StructuralAnalyzer,
    engine: &ViolationEngine,
    path: &Path,
) -> Result<Vec<Violation>, QualityError> {
    let text = reader
        .read_to_string(path)
        .map_err(|source| QualityError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
    let analysis = analyzer.extract(Language::from_path(path), &text);
    let tests = SiblingTestLookup::new(reader, path);
    Ok(engine.score(path, &analysis, &tests))
}

/// Debouncer → analyzer → engine → tracker → reporter
pub struct Pipeline {
    analyzer: Arc<StructuralAnalyzer>,
    engine: Arc<ViolationEngine>,
    reader: Arc<dyn SourceReader>,
    reports: ReportGenerator,
    verbose: bool,
    no_emoji: bool,
}

impl Pipeline {
    pub fn new(engine: ViolationEngine, reader: Arc<dyn SourceReader>, reports: ReportGenerator) -> Self {
        Self {
            analyzer: Arc::new(StructuralAnalyzer::new()),
            engine: Arc::new(engine),
            reader,
            reports,
            verbose: false,
            no_emoji: false,
        }
    }

    /// Use a custom analyzer (e.g. with substituted extractors)
    pub fn with_analyzer(mut self, analyzer: StructuralAnalyzer) -> Self {
        self.analyzer = Arc::new(analyzer);
        self
    }

    /// Log every violation with its suggestion
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn no_emoji(mut self, no_emoji: bool) -> Self {
        self.no_emoji = no_emoji;
        self
    }

    /// Run until `shutdown` resolves or the event source closes.
    ///
    /// Returns an error only for faults the loop cannot recover from (a
    /// panicked analysis task). Pending timers are cancelled on every exit
    /// path.
    pub async fn run<S>(
        &self,
        debouncer: &mut ChangeDebouncer,
        tracker: &mut ViolationTracker,
        mut events: mpsc::UnboundedReceiver<WatchInput>,
        shutdown: S,
    ) -> Result<()>
    where
        S: Future<Output = ()>,
    {
        let mut in_flight: JoinSet<Completion> = JoinSet::new();
        // revisions of analyses spawned but not yet committed
        let mut outstanding: BTreeSet<Revision> = BTreeSet::new();
        tokio::pin!(shutdown);

        let outcome = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    debug!("Shutdown requested");
                    break Ok(());
                }
                input = events.recv() => match input {
                    Some(WatchInput::Event(event)) => {
                        self.on_event(debouncer, tracker, event);
                        tracker.prune(outstanding.first().copied());
                    }
                    Some(WatchInput::Error(e)) => warn!("{}", e),
                    None => {
                        debug!("Event source closed");
                        break Ok(());
                    }
                },
                Some(fired) = debouncer.next_fired() => {
                    if let Some(Trigger::Analyze { path, kind, revision }) = debouncer.fire(fired) {
                        outstanding.insert(revision);
                        self.spawn_analysis(&mut in_flight, path, kind, revision);
                    }
                }
                Some(joined) = in_flight.join_next() => {
                    match joined.context("analysis task failed") {
                        Ok(completion) => {
                            outstanding.remove(&completion.revision);
                            self.on_completion(tracker, completion);
                            tracker.prune(outstanding.first().copied());
                        }
                        Err(e) => break Err(e),
                    }
                }
            }
        };

        debouncer.cancel_all();
        in_flight.abort_all();
        outcome
    }

    fn on_event(&self, debouncer: &mut ChangeDebouncer, tracker: &mut ViolationTracker, event: FileEvent) {
        if let Some(Trigger::Evict { path, revision }) = debouncer.on_event(event) {
            if tracker.evict(&path, revision) {
                info!("🗑️  removed: {}", self.display_path(&path));
                self.publish(tracker);
            }
        }
    }

    fn spawn_analysis(&self, in_flight: &mut JoinSet<Completion>, path: PathBuf, kind: ChangeKind, revision: Revision) {
        debug!("📝 {}: {}", kind, self.display_path(&path));
        let reader = Arc::clone(&self.reader);
        let analyzer = Arc::clone(&self.analyzer);
        let engine = Arc::clone(&self.engine);

        in_flight.spawn_blocking(move || {
            let result = analyze_source(reader.as_ref(), &analyzer, &engine, &path);
            Completion {
                path,
                kind,
                revision,
                result,
            }
        });
    }

    fn on_completion(&self, tracker: &mut ViolationTracker, completion: Completion) {
        let Completion {
            path,
            kind,
            revision,
            result,
        } = completion;

        let violations = match result {
            Ok(violations) => violations,
            Err(e) => {
                // the previous record, if any, stays as it was
                error!("Analysis failed for {} ({}): {}", self.display_path(&path), kind, e);
                return;
            }
        };

        match tracker.commit(&path, revision, violations) {
            Commit::Stale => {
                debug!("Discarding stale result for {} (revision {})", path.display(), revision);
            }
            Commit::Applied(trend) => {
                let Some(record) = tracker.get(&path) else {
                    return;
                };
                self.log_result(&path, trend, &record.violations);
                self.reports.notify(&path, &record.violations);
                self.publish(tracker);
            }
        }
    }

    fn log_result(&self, path: &Path, trend: Trend, violations: &[Violation]) {
        let status = match violations.len() {
            0 => "No issues".to_string(),
            1 => "1 violation".to_string(),
            n => format!("{} violations", n),
        };
        info!("{} {}: {}", trend.icon(self.no_emoji), self.display_path(path), status);

        if !self.verbose {
            return;
        }
        for v in violations {
            let icon = match (v.severity, self.no_emoji) {
                (Severity::Error, false) => "❌",
                (Severity::Warning, false) => "⚠️",
                (Severity::Error, true) => "ERR ",
                (Severity::Warning, true) => "WARN",
            };
            info!("  {} Line {}: {}", icon, v.line, v.message);
            info!("     {} {}", if self.no_emoji { "->" } else { "💡" }, v.suggestion);
        }
    }

    fn publish(&self, tracker: &ViolationTracker) {
        if let Err(e) = self.reports.publish(tracker) {
            warn!("{}", e);
        }
    }

    fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(self.reports.root())
            .unwrap_or(path)
            .display()
            .to_string()
    }
}
