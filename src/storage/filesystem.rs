//! File system operations
//!
//! Thin wrappers over std::fs shared by the storage operations.

use std::fs::{self, Metadata};
use std::io::{self, ErrorKind};
use std::path::Path;

use crate::error::StorageError;

/// Creates a directory and any missing parents.
///
/// A regular file anywhere along `path` is a type mismatch on `virtual_path`,
/// not an I/O failure.
pub fn create_directory(path: &Path, virtual_path: &str) -> Result<(), StorageError> {
    fs::create_dir_all(path).map_err(|e| match e.kind() {
        ErrorKind::NotADirectory | ErrorKind::AlreadyExists => {
            StorageError::not_a_directory(virtual_path)
        }
        _ => StorageError::Io(e),
    })
}

pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Metadata of the entry itself, without following a final symlink.
/// `None` when nothing is there.
pub fn entry_metadata(path: &Path) -> io::Result<Option<Metadata>> {
    match fs::symlink_metadata(path) {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
