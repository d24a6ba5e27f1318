//! Rule thresholds and enforcement settings
//!
//! # Configuration Format
//!
//! ```json
//! {
//!   "rules": {
//!     "max_file_lines": 200,
//!     "max_function_lines": 50,
//!     "max_complexity": 10,
//!     "require_tests": true,
//!     "require_docstrings": true
//!   },
//!   "enforcement": { "level": "error", "real_time_feedback": true }
//! }
//! ```
//!
//! Every field is optional and unknown keys are ignored.

use crate::models::Severity;
use serde::Deserialize;

/// Thresholds and enabled checks. Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub max_file_lines: usize,
    pub max_function_lines: usize,
    pub max_complexity: usize,
    pub require_tests: bool,
    pub require_docstrings: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            max_file_lines: 200,
            max_function_lines: 50,
            max_complexity: 10,
            require_tests: true,
            require_docstrings: true,
        }
    }
}

/// How hard violations are enforced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementLevel {
    /// Violations keep their native severity (default)
    #[default]
    Error,
    /// Nothing is blocking: every violation is reported as a warning
    Warning,
}

impl EnforcementLevel {
    /// Clamp a violation's native severity to this level
    pub fn cap(&self, severity: Severity) -> Severity {
        match self {
            EnforcementLevel::Error => severity,
            EnforcementLevel::Warning => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnforcementConfig {
    pub level: EnforcementLevel,
    /// When false, no notification requests are produced
    pub real_time_feedback: bool,
}

impl Default for EnforcementConfig {
    fn default() -> Self {
        Self {
            level: EnforcementLevel::Error,
            real_time_feedback: true,
        }
    }
}

/// Top-level `quality-config.json` document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct QualityConfig {
    pub rules: RuleSet,
    pub enforcement: EnforcementConfig,
}
