//! quality-watch - live code-quality feedback
//!
//! Watches source trees, debounces changes per path, extracts function-like
//! units with a heuristic scanner, scores them against a [`RuleSet`] and
//! keeps a per-file violation record plus an aggregate quality score.
//!
//! The pieces compose as:
//! [`ChangeDebouncer`] → [`StructuralAnalyzer`] → [`ViolationEngine`] →
//! [`ViolationTracker`] → [`ReportGenerator`], wired together by
//! [`Pipeline`].

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod parsers;
pub mod pipeline;
pub mod reporters;
pub mod rules;
pub mod source;
pub mod tracker;
pub mod watch;

pub use config::{QualityConfig, RuleSet};
pub use error::QualityError;
pub use models::{ChangeKind, FileEvent, Severity, Violation, ViolationType};
pub use parsers::StructuralAnalyzer;
pub use pipeline::Pipeline;
pub use reporters::ReportGenerator;
pub use rules::ViolationEngine;
pub use tracker::ViolationTracker;
pub use watch::ChangeDebouncer;
