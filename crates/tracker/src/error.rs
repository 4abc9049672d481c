//! Error types for the tracker crate.

use crate::validator::RecordRejection;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tracker operations.
pub type TrackerResult<T> = Result<T, TrackerError>;

/// Errors that can occur while recording, querying or exporting issues.
#[derive(Error, Debug, Clone)]
pub enum TrackerError {
    /// Candidate record failed entry validation. Nothing was persisted.
    #[error("Record rejected: {}", join_rejections(.0))]
    Rejected(Vec<RecordRejection>),

    /// A row in the store file could not be decoded.
    #[error("Corrupt store row {line}: {message}")]
    CorruptRow { line: u64, message: String },

    /// Store file could not be read or written.
    #[error("Storage error at {path:?}: {message}")]
    Storage { path: PathBuf, message: String },

    /// External sheet could not be read.
    #[error("Import failed: {0}")]
    Import(String),

    /// Export artifact could not be produced.
    #[error("Export failed: {0}")]
    Export(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TrackerError {
    pub fn storage(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        TrackerError::Storage {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// True when the error is a validation rejection rather than an I/O fault.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TrackerError::Rejected(_))
    }
}

fn join_rejections(rejections: &[RecordRejection]) -> String {
    rejections
        .iter()
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for TrackerError {
    fn from(err: csv::Error) -> Self {
        TrackerError::Serialization(err.to_string())
    }
}
