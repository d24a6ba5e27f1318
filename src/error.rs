//! Error taxonomy for the watch pipeline
//!
//! Every variant here is non-fatal to the event loop: it is logged and the
//! affected pass is skipped. Faults that end the loop surface as
//! `anyhow::Error` from the engine's entry point instead.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while watching and analyzing files
#[derive(Error, Debug)]
pub enum QualityError {
    #[error("Failed to load quality config {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Watcher error: {0}")]
    Watcher(String),

    #[error("Failed to write status file {path}: {source}")]
    StatusWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<notify::Error> for QualityError {
    fn from(err: notify::Error) -> Self {
        QualityError::Watcher(err.to_string())
    }
}
