//! Reading source text
//!
//! All file reads in the pipeline go through [`SourceReader`] so tests can
//! serve file contents from memory.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Capability that returns the text of a file
pub trait SourceReader: Send + Sync {
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Reads straight from the filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// In-memory file set, used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryReader {
    files: RwLock<HashMap<PathBuf, String>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<String>) {
        if let Ok(mut files) = self.files.write() {
            files.insert(path.into(), content.into());
        }
    }

    pub fn remove(&self, path: &Path) {
        if let Ok(mut files) = self.files.write() {
            files.remove(path);
        }
    }
}

impl SourceReader for MemoryReader {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let files = self
            .files
            .read()
            .map_err(|_| io::Error::other("file set lock poisoned"))?;
        files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            )
        })
    }
}
