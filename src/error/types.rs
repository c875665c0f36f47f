//! Error types
//!
//! Defines the error taxonomy for storage operations and server startup.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::storage::results::EntryKind;

/// Storage module errors
///
/// Every variant carries caller-facing context only: relative paths or the raw
/// rejected input, never the absolute location on disk.
#[derive(Debug, Error)]
pub enum StorageError {
    /// A required field was missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The request resolved outside the storage root. Holds the raw input.
    #[error("path escapes storage root: {0:?}")]
    Containment(String),

    /// Target does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// Target exists but is the wrong kind of entry.
    #[error("{path} is not a {expected}")]
    TypeMismatch { path: String, expected: EntryKind },

    /// Upload exceeded the configured size limit (in bytes).
    #[error("upload exceeds limit of {0} bytes")]
    PayloadTooLarge(u64),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    pub fn not_a_directory(path: impl Into<String>) -> Self {
        StorageError::TypeMismatch {
            path: path.into(),
            expected: EntryKind::Directory,
        }
    }

    pub fn not_a_file(path: impl Into<String>) -> Self {
        StorageError::TypeMismatch {
            path: path.into(),
            expected: EntryKind::File,
        }
    }
}

/// Server startup errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("storage root {path:?} unusable: {source}")]
    StorageRoot { path: PathBuf, source: io::Error },

    #[error("failed to bind to {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
