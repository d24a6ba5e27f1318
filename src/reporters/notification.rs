//! Notification requests
//!
//! A request is only built when a file has violations. Delivery is
//! fire-and-forget through a [`Notifier`]; the shipped implementation
//! writes the request to the log stream.

use crate::models::{Severity, Violation};
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub const NOTIFICATION_TITLE: &str = "🛡️ Quality Guard";
pub const NOTIFICATION_ICON: &str = "assets/quality-guard-icon.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationRequest {
    pub title: String,
    pub message: String,
    pub icon: String,
    pub sound: bool,
    pub timeout: u32,
}

/// Build a request summarizing error and warning counts for `path`
pub fn notification_for(path: &Path, violations: &[Violation]) -> Option<NotificationRequest> {
    if violations.is_empty() {
        return None;
    }

    let errors = violations.iter().filter(|v| v.severity == Severity::Error).count();
    let warnings = violations.iter().filter(|v| v.severity == Severity::Warning).count();

    let mut parts = Vec::new();
    if errors > 0 {
        parts.push(plural(errors, "error"));
    }
    if warnings > 0 {
        parts.push(plural(warnings, "warning"));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Some(NotificationRequest {
        title: NOTIFICATION_TITLE.to_string(),
        message: format!("{}: {}", file_name, parts.join(", ")),
        icon: NOTIFICATION_ICON.to_string(),
        sound: false,
        timeout: 5,
    })
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{} {}", n, noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

/// Notification delivery collaborator
pub trait Notifier: Send + Sync {
    fn notify(&self, request: &NotificationRequest);
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn notify(&self, request: &NotificationRequest) {
        (**self).notify(request);
    }
}

/// Writes requests to the log stream
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, request: &NotificationRequest) {
        info!("{} {}", request.title, request.message);
    }
}

/// Keeps every request, for tests and embedding
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<NotificationRequest>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, request: &NotificationRequest) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request.clone());
        }
    }
}
