//! Per-path change debouncing
//!
//! Each `added`/`changed` event cancels the path's pending timer and starts a
//! new one; only a timer that survives the whole period fires, and it carries
//! the most recent kind. A `removed` event cancels the timer and is returned
//! as an eviction straight away.
//!
//! Timers are tokio tasks sleeping until a deadline. When one wakes it sends
//! a [`Fired`] token back through the debouncer's channel; [`fire`] turns the
//! token into an analysis trigger only if it still matches the pending entry,
//! so a timer that raced its own cancellation is ignored.
//!
//! [`fire`]: ChangeDebouncer::fire

use crate::models::{ChangeKind, FileEvent};
use crate::tracker::Revision;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

/// Default quiet period
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Token sent by a timer when its period elapses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired {
    path: PathBuf,
    revision: Revision,
}

/// What the pipeline should do for a path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Analyze {
        path: PathBuf,
        kind: ChangeKind,
        revision: Revision,
    },
    Evict {
        path: PathBuf,
        revision: Revision,
    },
}

struct Pending {
    revision: Revision,
    kind: ChangeKind,
    timer: JoinHandle<()>,
}

/// Owns the path-keyed timer set
pub struct ChangeDebouncer {
    period: Duration,
    pending: HashMap<PathBuf, Pending>,
    next_revision: Revision,
    fired_tx: mpsc::UnboundedSender<Fired>,
    fired_rx: mpsc::UnboundedReceiver<Fired>,
}

impl ChangeDebouncer {
    pub fn new(period: Duration) -> Self {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        Self {
            period,
            pending: HashMap::new(),
            next_revision: 0,
            fired_tx,
            fired_rx,
        }
    }

    /// Number of timers currently waiting
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, path: &Path) -> bool {
        self.pending.contains_key(&resolve(path))
    }

    /// Schedule, reschedule or evict. Must be called inside a tokio runtime.
    ///
    /// Returns `Some(Trigger::Evict)` for removals; other kinds only arm a
    /// timer and return `None`.
    pub fn on_event(&mut self, event: FileEvent) -> Option<Trigger> {
        let path = resolve(&event.path);
        self.cancel(&path);
        let revision = self.bump();

        if event.kind == ChangeKind::Removed {
            debug!("Evicting {} (revision {})", path.display(), revision);
            return Some(Trigger::Evict { path, revision });
        }

        let deadline = Instant::now() + self.period;
        let tx = self.fired_tx.clone();
        let token = Fired {
            path: path.clone(),
            revision,
        };
        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            let _ = tx.send(token);
        });

        debug!(
            "Scheduled {} for {} in {:?} (revision {})",
            event.kind,
            path.display(),
            self.period,
            revision
        );
        self.pending.insert(
            path,
            Pending {
                revision,
                kind: event.kind,
                timer,
            },
        );
        None
    }

    /// Wait for the next timer to elapse
    pub async fn next_fired(&mut self) -> Option<Fired> {
        self.fired_rx.recv().await
    }

    /// Turn a fired token into an analysis trigger if it is still current
    pub fn fire(&mut self, fired: Fired) -> Option<Trigger> {
        match self.pending.get(&fired.path) {
            Some(pending) if pending.revision == fired.revision => {
                let pending = self.pending.remove(&fired.path)?;
                Some(Trigger::Analyze {
                    path: fired.path,
                    kind: pending.kind,
                    revision: pending.revision,
                })
            }
            _ => {
                debug!("Dropping superseded timer for {}", fired.path.display());
                None
            }
        }
    }

    /// Abort every pending timer
    pub fn cancel_all(&mut self) {
        for (_, pending) in self.pending.drain() {
            pending.timer.abort();
        }
    }

    fn cancel(&mut self, path: &Path) {
        if let Some(pending) = self.pending.remove(path) {
            pending.timer.abort();
        }
    }

    fn bump(&mut self) -> Revision {
        self.next_revision += 1;
        self.next_revision
    }
}

impl Drop for ChangeDebouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Absolute form of `path`, without touching the filesystem
pub fn resolve(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERIOD: Duration = Duration::from_millis(500);

    fn changed(path: &str) -> FileEvent {
        FileEvent::new(path, ChangeKind::Changed)
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_one_trigger() {
        let mut debouncer = ChangeDebouncer::new(PERIOD);
        for _ in 0..5 {
            assert!(debouncer.on_event(changed("/src/a.py")).is_none());
            tokio::time::advance(Duration::from_millis(100)).await;
        }

        let fired = debouncer.next_fired().await.unwrap();
        let trigger = debouncer.fire(fired).unwrap();
        assert!(matches!(
            trigger,
            Trigger::Analyze { kind: ChangeKind::Changed, revision: 5, .. }
        ));
        assert_eq!(debouncer.pending(), 0);

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(debouncer.fired_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_kind_wins() {
        let mut debouncer = ChangeDebouncer::new(PERIOD);
        debouncer.on_event(changed("/src/a.py"));
        debouncer.on_event(FileEvent::new("/src/a.py", ChangeKind::Added));

        let fired = debouncer.next_fired().await.unwrap();
        match debouncer.fire(fired) {
            Some(Trigger::Analyze { kind, .. }) => assert_eq!(kind, ChangeKind::Added),
            other => panic!("unexpected trigger: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_fires_after_full_period() {
        let mut debouncer = ChangeDebouncer::new(PERIOD);
        let start = Instant::now();
        debouncer.on_event(changed("/src/a.py"));
        debouncer.next_fired().await.unwrap();
        assert!(start.elapsed() >= PERIOD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paths_are_independent() {
        let mut debouncer = ChangeDebouncer::new(PERIOD);
        debouncer.on_event(changed("/src/a.py"));
        debouncer.on_event(changed("/src/b.py"));
        debouncer.on_event(changed("/src/a.py"));

        let mut analyzed = Vec::new();
        for _ in 0..2 {
            let fired = debouncer.next_fired().await.unwrap();
            if let Some(Trigger::Analyze { path, .. }) = debouncer.fire(fired) {
                analyzed.push(path);
            }
        }
        analyzed.sort();
        assert_eq!(analyzed, vec![PathBuf::from("/src/a.py"), PathBuf::from("/src/b.py")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_removed_cancels_and_evicts_immediately() {
        let mut debouncer = ChangeDebouncer::new(PERIOD);
        debouncer.on_event(changed("/src/a.py"));
        assert!(debouncer.is_pending(Path::new("/src/a.py")));

        let trigger = debouncer.on_event(FileEvent::new("/src/a.py", ChangeKind::Removed));
        assert_eq!(
            trigger,
            Some(Trigger::Evict {
                path: PathBuf::from("/src/a.py"),
                revision: 2,
            })
        );
        assert_eq!(debouncer.pending(), 0);

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(debouncer.fired_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_token_is_ignored() {
        let mut debouncer = ChangeDebouncer::new(PERIOD);
        debouncer.on_event(changed("/src/a.py"));
        let stale = Fired {
            path: PathBuf::from("/src/a.py"),
            revision: 0,
        };
        assert!(debouncer.fire(stale).is_none());
        assert_eq!(debouncer.pending(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let mut debouncer = ChangeDebouncer::new(PERIOD);
        debouncer.on_event(changed("/src/a.py"));
        debouncer.on_event(changed("/src/b.py"));
        debouncer.cancel_all();
        assert_eq!(debouncer.pending(), 0);

        tokio::time::advance(Duration::from_secs(10)).await;
        tokio::task::yield_now().await;
        assert!(debouncer.fired_rx.try_recv().is_err());
    }

    #[test]
    fn test_resolve_makes_relative_paths_absolute() {
        assert!(resolve(Path::new("src/a.py")).is_absolute());
        assert_eq!(resolve(Path::new("/x/y.py")), PathBuf::from("/x/y.py"));
    }
}
