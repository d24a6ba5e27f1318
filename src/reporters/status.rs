//! Status artifact
//!
//! Outputs a pretty-printed JSON snapshot of the tracker for other tools.
//! The file is overwritten on every report cycle (last write wins).

use crate::error::QualityError;
use crate::models::{Severity, Violation, ViolationType};
use crate::tracker::{Aggregate, FileRecord, ViolationTracker};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::path::Path;

/// Default artifact name, written relative to the working root
pub const STATUS_FILE: &str = ".quality-status.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub timestamp: String,
    pub summary: Aggregate,
    pub files: Vec<FileStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileStatus {
    pub path: String,
    pub violation_count: usize,
    pub violations: Vec<ViolationStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationStatus {
    #[serde(rename = "type")]
    pub kind: ViolationType,
    pub line: usize,
    pub severity: Severity,
    pub message: String,
}

impl From<&Violation> for ViolationStatus {
    fn from(v: &Violation) -> Self {
        Self {
            kind: v.kind,
            line: v.line,
            severity: v.severity,
            message: v.message.clone(),
        }
    }
}

/// Build a snapshot of `tracker` stamped with `at`. Paths are shown
/// relative to `root` when they live under it.
pub fn render_at(tracker: &ViolationTracker, root: &Path, at: DateTime<Utc>) -> StatusSnapshot {
    StatusSnapshot {
        timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        summary: tracker.aggregate(),
        files: tracker
            .records()
            .map(|record| file_status(record, root))
            .collect(),
    }
}

fn file_status(record: &FileRecord, root: &Path) -> FileStatus {
    let rel = record.path.strip_prefix(root).unwrap_or(&record.path);
    FileStatus {
        path: rel.to_string_lossy().into_owned(),
        violation_count: record.count(),
        violations: record.violations.iter().map(ViolationStatus::from).collect(),
    }
}

/// Render snapshot as JSON
pub fn to_json(snapshot: &StatusSnapshot) -> serde_json::Result<String> {
    serde_json::to_string_pretty(snapshot)
}

/// Overwrite the artifact at `path`
pub fn write(snapshot: &StatusSnapshot, path: &Path) -> Result<(), QualityError> {
    let json = to_json(snapshot).map_err(|e| QualityError::StatusWrite {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    std::fs::write(path, json).map_err(|source| QualityError::StatusWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn violation(kind: ViolationType, line: usize) -> Violation {
        Violation {
            kind,
            line,
            message: format!("{} at {}", kind, line),
            suggestion: "do better".into(),
            severity: Severity::Error,
            function_name: Some("f".into()),
        }
    }

    fn tracker() -> ViolationTracker {
        let mut tracker = ViolationTracker::new();
        tracker.commit(
            Path::new("/repo/src/b.py"),
            1,
            vec![violation(ViolationType::FileTooLarge, 0)],
        );
        tracker.commit(Path::new("/repo/src/a.py"), 2, vec![]);
        tracker
    }

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_snapshot_shape() {
        let snapshot = render_at(&tracker(), Path::new("/repo"), at());
        let json: serde_json::Value =
            serde_json::from_str(&to_json(&snapshot).unwrap()).unwrap();

        assert_eq!(json["timestamp"], "2026-10-18T12:00:00.000Z");
        assert_eq!(json["summary"]["totalFiles"], 2);
        assert_eq!(json["summary"]["filesWithViolations"], 1);
        assert_eq!(json["summary"]["totalViolations"], 1);
        assert_eq!(json["summary"]["qualityScore"], 98);

        let files = json["files"].as_array().unwrap();
        assert_eq!(files[0]["path"], "src/a.py");
        assert_eq!(files[1]["path"], "src/b.py");
        assert_eq!(files[1]["violationCount"], 1);
        let v = &files[1]["violations"][0];
        assert_eq!(v["type"], "FILE_TOO_LARGE");
        assert_eq!(v["line"], 0);
        assert_eq!(v["severity"], "error");
        // suggestion and function name stay out of the artifact
        assert!(v.get("suggestion").is_none());
    }

    #[test]
    fn test_render_is_idempotent() {
        let tracker = tracker();
        let first = render_at(&tracker, Path::new("/repo"), at());
        let second = render_at(&tracker, Path::new("/repo"), at());
        assert_eq!(first, second);
        assert_eq!(to_json(&first).unwrap(), to_json(&second).unwrap());
    }

    #[test]
    fn test_write_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STATUS_FILE);
        let mut tracker = tracker();

        write(&render_at(&tracker, Path::new("/repo"), at()), &path).unwrap();
        tracker.evict(Path::new("/repo/src/b.py"), 3);
        write(&render_at(&tracker, Path::new("/repo"), at()), &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["files"].as_array().unwrap().len(), 1);
        assert_eq!(json["summary"]["qualityScore"], 100);
    }

    #[test]
    fn test_write_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing/status.json");
        let err = write(&render_at(&tracker(), Path::new("/repo"), at()), &path).unwrap_err();
        assert!(matches!(err, QualityError::StatusWrite { .. }));
    }
}
