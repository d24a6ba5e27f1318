//! Configuration module for quality-watch
//!
//! This module handles:
//! - Rule thresholds and enabled checks (`rules`)
//! - Enforcement level and real-time feedback toggle (`enforcement`)
//! - Loading `quality-config.json` with fallback to built-in defaults

mod loader;
mod rules;

pub use loader::{load_quality_config, DEFAULT_CONFIG_FILE};
pub use rules::{EnforcementConfig, EnforcementLevel, QualityConfig, RuleSet};
