//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Kind of filesystem entry an operation expected to find
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => write!(f, "file"),
            EntryKind::Directory => write!(f, "directory"),
        }
    }
}

/// One immediate child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
    /// Byte size, present only for regular files.
    pub size: Option<u64>,
}

/// A validated file ready to be sent to the caller
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub path: PathBuf,
    pub filename: String,
    pub virtual_path: String,
    pub size: u64,
}

/// A validated upload destination
///
/// Content is written to `temp_path` and renamed onto `final_path` once the
/// transfer completes.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    pub final_path: PathBuf,
    pub temp_path: PathBuf,
    pub filename: String,
    pub virtual_path: String,
}

/// Result of a completed upload
#[derive(Debug, Clone)]
pub struct UploadResult {
    pub filename: String,
    pub virtual_path: String,
    pub bytes_written: u64,
}

/// Result of a file deletion operation
#[derive(Debug, Clone)]
pub struct DeleteResult {
    pub filename: String,
    pub virtual_path: String,
}

/// Result of a folder creation operation
#[derive(Debug, Clone)]
pub struct CreateFolderResult {
    pub folder_name: String,
    pub virtual_path: String,
    /// False when the folder was already there.
    pub created: bool,
}
