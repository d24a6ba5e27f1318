//! Report generation for quality-watch
//!
//! Produces two outputs after every committed or evicted path:
//! - `status` - JSON status artifact rebuilt from the tracker
//! - `notification` - a notification request when a file has violations

pub mod notification;
pub mod status;

pub use notification::{notification_for, LogNotifier, NotificationRequest, Notifier, RecordingNotifier};
pub use status::{render_at, FileStatus, StatusSnapshot, ViolationStatus, STATUS_FILE};

use crate::error::QualityError;
use crate::models::Violation;
use crate::tracker::ViolationTracker;
use std::path::{Path, PathBuf};

/// Renders tracker state and emits notification requests
pub struct ReportGenerator {
    root: PathBuf,
    status_path: Option<PathBuf>,
    notifier: Option<Box<dyn Notifier>>,
}

impl ReportGenerator {
    /// Generator showing paths relative to `root`, with no outputs attached
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            status_path: None,
            notifier: None,
        }
    }

    /// Write the status artifact to `path` on every cycle
    pub fn with_status_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.status_path = Some(path.into());
        self
    }

    /// Deliver notification requests through `notifier`
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Snapshot of the tracker stamped with the current time
    pub fn render(&self, tracker: &ViolationTracker) -> StatusSnapshot {
        render_at(tracker, &self.root, chrono::Utc::now())
    }

    /// Render and write the status artifact, if one is configured
    pub fn publish(&self, tracker: &ViolationTracker) -> Result<Option<StatusSnapshot>, QualityError> {
        let Some(path) = &self.status_path else {
            return Ok(None);
        };
        let snapshot = self.render(tracker);
        status::write(&snapshot, path)?;
        Ok(Some(snapshot))
    }

    /// Send a notification for `path` when it has violations
    pub fn notify(&self, path: &Path, violations: &[Violation]) -> Option<NotificationRequest> {
        let notifier = self.notifier.as_ref()?;
        let request = notification_for(path, violations)?;
        notifier.notify(&request);
        Some(request)
    }
}
