//! Locating conventionally-named test artifacts
//!
//! A lookup only reads other files; it never touches tracked state. Any
//! read failure counts as "no test found".

use crate::parsers::Language;
use crate::source::SourceReader;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Capability answering whether a function has a test
pub trait TestLookup {
    /// `file_base` is the source file name without extension
    fn has_test(&self, file_base: &str, function_name: &str) -> bool;
}

/// Looks for sibling test files next to the analyzed source
pub struct SiblingTestLookup<'a> {
    reader: &'a dyn SourceReader,
    dir: PathBuf,
    language: Language,
    extension: String,
}

impl<'a> SiblingTestLookup<'a> {
    pub fn new(reader: &'a dyn SourceReader, source_path: &Path) -> Self {
        Self {
            reader,
            dir: source_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            language: Language::from_path(source_path),
            extension: source_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_string(),
        }
    }

    /// Candidate test files, most conventional first
    pub fn candidates(&self, file_base: &str) -> Vec<PathBuf> {
        let ext = &self.extension;
        let names: Vec<String> = match self.language {
            Language::Python => vec![
                format!("tests/test_{file_base}.py"),
                format!("test_{file_base}.py"),
                format!("{file_base}_test.py"),
                format!("tests/{file_base}_test.py"),
            ],
            _ => vec![
                format!("test_{file_base}.{ext}"),
                format!("{file_base}.test.{ext}"),
                format!("{file_base}.spec.{ext}"),
                format!("tests/test_{file_base}.{ext}"),
                format!("tests/{file_base}.test.{ext}"),
                format!("__tests__/{file_base}.test.{ext}"),
            ],
        };
        names.into_iter().map(|name| self.dir.join(name)).collect()
    }
}

impl TestLookup for SiblingTestLookup<'_> {
    fn has_test(&self, file_base: &str, function_name: &str) -> bool {
        let Ok(pattern) = Regex::new(&format!(r"\btest_{}", regex::escape(function_name))) else {
            return false;
        };

        self.candidates(file_base).iter().any(|candidate| {
            match self.reader.read_to_string(candidate) {
                Ok(content) => pattern.is_match(&content),
                Err(e) => {
                    debug!("No test artifact at {}: {}", candidate.display(), e);
                    false
                }
            }
        })
    }
}
