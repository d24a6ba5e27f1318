//! Core data models for quality-watch
//!
//! These models are shared by the analyzer, the rule engine, the tracker
//! and the reporters.

use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// Severity levels for violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Kind of rule breach
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationType {
    FileTooLarge,
    FunctionTooLong,
    HighComplexity,
    MissingDocumentation,
    MissingTest,
}

impl ViolationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationType::FileTooLarge => "FILE_TOO_LARGE",
            ViolationType::FunctionTooLong => "FUNCTION_TOO_LONG",
            ViolationType::HighComplexity => "HIGH_COMPLEXITY",
            ViolationType::MissingDocumentation => "MISSING_DOCUMENTATION",
            ViolationType::MissingTest => "MISSING_TEST",
        }
    }
}

impl std::fmt::Display for ViolationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rule breach for a file or one of its functions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(rename = "type")]
    pub kind: ViolationType,
    /// 1-based line; 0 means file-level
    pub line: usize,
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_name: Option<String>,
}

/// Boundary and metadata of one function-like unit.
///
/// `start_offset..end_offset` partitions the file: the end of one span is the
/// start of the next, and the last span runs to end of file. `extent` is the
/// region the function's metrics are computed over, which may reach past
/// `end_offset` when nested functions follow the introducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSpan {
    pub name: String,
    /// 1-based
    pub start_line: usize,
    pub start_offset: usize,
    pub end_offset: usize,
    pub indentation: usize,
    pub extent: Range<usize>,
}

/// Per-function metrics computed over a span's extent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionMetrics {
    pub name: String,
    pub start_line: usize,
    /// Lines excluding blank and comment-only lines
    pub lines: usize,
    pub complexity: usize,
    pub has_documentation: bool,
}

/// File-level metrics, independent of function content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileMetrics {
    pub total_lines: usize,
}

/// Result of running the structural analyzer over one file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileAnalysis {
    pub metrics: FileMetrics,
    pub functions: Vec<FunctionMetrics>,
}

/// How a file's violation count moved between two analyses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Increased,
    Decreased,
    Unchanged,
    /// Count is zero, whether it just dropped there or stayed there
    Resolved,
}

impl Trend {
    pub fn classify(previous: usize, current: usize) -> Self {
        if current == 0 {
            Trend::Resolved
        } else if current > previous {
            Trend::Increased
        } else if current < previous {
            Trend::Decreased
        } else {
            Trend::Unchanged
        }
    }

    /// Map trend to display icon
    pub fn icon(&self, no_emoji: bool) -> &'static str {
        match (self, no_emoji) {
            (Trend::Resolved, true) => "OK  ",
            (Trend::Resolved, false) => "✅",
            (Trend::Increased, true) => "UP  ",
            (Trend::Increased, false) => "⬆️",
            (Trend::Decreased, true) => "DOWN",
            (Trend::Decreased, false) => "⬇️",
            (Trend::Unchanged, true) => "SAME",
            (Trend::Unchanged, false) => "🔄",
        }
    }
}

/// Kind of filesystem change reported by the watcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeKind::Added => write!(f, "added"),
            ChangeKind::Changed => write!(f, "changed"),
            ChangeKind::Removed => write!(f, "removed"),
        }
    }
}

/// A filesystem event as delivered by the watch collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    pub path: PathBuf,
    pub kind: ChangeKind,
}

impl FileEvent {
    pub fn new(path: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}
