//! Loading of `quality-config.json`
//!
//! A missing, unreadable or malformed document never stops the watcher:
//! the failure is logged and the built-in defaults apply.

use super::QualityConfig;
use crate::error::QualityError;
use std::path::Path;
use tracing::{debug, warn};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "quality-config.json";

/// Load the quality config at `path`, falling back to defaults
pub fn load_quality_config(path: &Path) -> QualityConfig {
    if !path.exists() {
        debug!("No quality config at {}, using defaults", path.display());
        return QualityConfig::default();
    }

    match load_json_config(path) {
        Ok(config) => {
            debug!("Loaded quality config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{}", e);
            QualityConfig::default()
        }
    }
}

fn load_json_config(path: &Path) -> Result<QualityConfig, QualityError> {
    let content = std::fs::read_to_string(path).map_err(|e| QualityError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| QualityError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnforcementLevel;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_quality_config(&dir.path().join("absent.json"));
        assert_eq!(config, QualityConfig::default());
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, "{ rules: not json").unwrap();
        assert_eq!(load_quality_config(&path), QualityConfig::default());
    }

    #[test]
    fn test_wrong_field_type_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(&path, r#"{"rules": {"max_complexity": "ten"}}"#).unwrap();
        assert_eq!(load_quality_config(&path), QualityConfig::default());
    }

    #[test]
    fn test_valid_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{
                "rules": {"max_file_lines": 120, "require_tests": false},
                "enforcement": {"level": "warning", "real_time_feedback": false}
            }"#,
        )
        .unwrap();

        let config = load_quality_config(&path);
        assert_eq!(config.rules.max_file_lines, 120);
        assert!(!config.rules.require_tests);
        assert!(config.rules.require_docstrings);
        assert_eq!(config.enforcement.level, EnforcementLevel::Warning);
        assert!(!config.enforcement.real_time_feedback);
    }
}
