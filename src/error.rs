//! Error types for docpack.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for docpack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while converting, exporting, or batching.
#[derive(Error, Debug)]
pub enum Error {
    /// The input could not be turned into a structured document
    /// (unreadable, unsupported, corrupt, or a backend failure).
    #[error("Conversion failed for '{}': {reason}", .path.display())]
    Conversion { path: PathBuf, reason: String },

    /// Writing an export artifact failed.
    #[error("Export failed at '{}': {reason}", .path.display())]
    Export { path: PathBuf, reason: String },

    /// A run was started with invalid inputs; nothing was processed.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// I/O error outside of an export (e.g. reading an input).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl Error {
    /// Build a conversion error for `path`.
    pub fn conversion(path: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Error::Conversion {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Build an export error for `path`.
    pub fn export(path: impl AsRef<Path>, reason: impl ToString) -> Self {
        Error::Export {
            path: path.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Build a precondition error.
    pub fn precondition(reason: impl Into<String>) -> Self {
        Error::Precondition(reason.into())
    }

    /// Category of this error, as recorded in batch reports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Conversion { .. } => ErrorKind::Conversion,
            Error::Export { .. } | Error::Json(_) => ErrorKind::Export,
            Error::Precondition(_) => ErrorKind::Precondition,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

/// Error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Conversion,
    Export,
    Precondition,
    Io,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Conversion => write!(f, "ConversionError"),
            ErrorKind::Export => write!(f, "ExportError"),
            ErrorKind::Precondition => write!(f, "PreconditionError"),
            ErrorKind::Io => write!(f, "IoError"),
        }
    }
}
