//! Storage operations
//!
//! Executes list, retrieve, store, delete and mkdir against the storage root.
//! Every entry point validates its input through [`crate::storage::validation`]
//! before touching the filesystem. All calls block; async callers should run
//! them on the blocking pool.

use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::StorageError;
use crate::storage::filesystem::{
    create_directory, directory_exists, entry_metadata, file_exists,
};
use crate::storage::results::{
    CreateFolderResult, DeleteResult, DirectoryEntry, DownloadTarget, UploadTarget,
};
use crate::storage::validation::{
    StorageRoot, resolve, resolve_and_validate_file_path, resolve_entry_path, virtual_path,
};

/// Lists the immediate children of a directory.
///
/// Order follows the filesystem's enumeration order.
pub fn list_directory(
    root: &StorageRoot,
    relative: &str,
) -> Result<Vec<DirectoryEntry>, StorageError> {
    let real_path = resolve(root, relative, &[])?;
    let current_virtual_path = virtual_path(root, &real_path);

    if !real_path.exists() {
        return Err(StorageError::NotFound(current_virtual_path));
    }
    if !real_path.is_dir() {
        return Err(StorageError::not_a_directory(current_virtual_path));
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(&real_path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if is_upload_temp_name(&name) {
            continue;
        }

        // Follows symlinks; a dangling link falls back to its own type
        let (is_dir, size) = match fs::metadata(entry.path()) {
            Ok(metadata) if metadata.is_file() => (false, Some(metadata.len())),
            Ok(metadata) => (metadata.is_dir(), None),
            Err(_) => (false, None),
        };

        entries.push(DirectoryEntry { name, is_dir, size });
    }

    info!(
        "Listed directory {} - {} entries",
        current_virtual_path,
        entries.len()
    );

    Ok(entries)
}

/// Validates a download request and locates the file
pub fn prepare_file_retrieval(
    root: &StorageRoot,
    relative: &str,
    filename: &str,
) -> Result<DownloadTarget, StorageError> {
    require_field(filename, "filename")?;

    let (file_path, virtual_file_path) =
        resolve_and_validate_file_path(root, relative, filename)?;

    if !file_path.exists() {
        return Err(StorageError::NotFound(virtual_file_path));
    }
    if !file_path.is_file() {
        return Err(StorageError::not_a_file(virtual_file_path));
    }

    let size = fs::metadata(&file_path)?.len();

    info!(
        "Prepared file retrieval for {} ({} bytes)",
        virtual_file_path, size
    );

    Ok(DownloadTarget {
        path: file_path,
        filename: filename.to_string(),
        virtual_path: virtual_file_path,
        size,
    })
}

/// Validates an upload request and prepares its destination.
///
/// The target directory is created if missing. An existing file of the same
/// name is left in place here and replaced when the transfer completes.
pub fn prepare_file_storage(
    root: &StorageRoot,
    relative: &str,
    filename: &str,
) -> Result<UploadTarget, StorageError> {
    require_field(filename, "filename")?;

    let directory = resolve(root, relative, &[])?;
    let (file_path, virtual_file_path) =
        resolve_and_validate_file_path(root, relative, filename)?;

    create_directory(&directory, &virtual_path(root, &directory))?;

    if directory_exists(&file_path) {
        return Err(StorageError::not_a_file(virtual_file_path));
    }

    let temp_path = temp_path_for(&file_path, filename);

    info!("Prepared file storage for {}", virtual_file_path);

    Ok(UploadTarget {
        final_path: file_path,
        temp_path,
        filename: filename.to_string(),
        virtual_path: virtual_file_path,
    })
}

/// Deletes exactly one regular file. Directories are refused, never removed.
pub fn delete_file(
    root: &StorageRoot,
    relative: &str,
    filename: &str,
) -> Result<DeleteResult, StorageError> {
    require_field(filename, "filename")?;

    let (file_path, virtual_file_path) = resolve_entry_path(root, relative, filename)?;

    match entry_metadata(&file_path)? {
        None => return Err(StorageError::NotFound(virtual_file_path)),
        Some(metadata) if metadata.is_dir() => {
            return Err(StorageError::not_a_file(virtual_file_path));
        }
        Some(_) => {}
    }

    fs::remove_file(&file_path).map_err(|e| match e.kind() {
        // Lost a race with another delete
        std::io::ErrorKind::NotFound => StorageError::NotFound(virtual_file_path.clone()),
        _ => StorageError::Io(e),
    })?;

    info!("Deleted file {}", virtual_file_path);

    Ok(DeleteResult {
        filename: filename.to_string(),
        virtual_path: virtual_file_path,
    })
}

/// Creates a folder and any missing parents. Succeeds if it already exists.
pub fn create_folder(
    root: &StorageRoot,
    relative: &str,
    folder_name: &str,
) -> Result<CreateFolderResult, StorageError> {
    require_field(folder_name, "folder_name")?;

    let folder_path = resolve(root, relative, &[folder_name])?;
    let virtual_folder_path = virtual_path(root, &folder_path);

    if file_exists(&folder_path) {
        return Err(StorageError::not_a_directory(virtual_folder_path));
    }

    let created = !directory_exists(&folder_path);
    create_directory(&folder_path, &virtual_folder_path)?;

    if created {
        info!("Created folder {}", virtual_folder_path);
    }

    Ok(CreateFolderResult {
        folder_name: folder_name.to_string(),
        virtual_path: virtual_folder_path,
        created,
    })
}

fn require_field(value: &str, field: &str) -> Result<(), StorageError> {
    if value.is_empty() {
        return Err(StorageError::Validation(format!("{} required", field)));
    }
    Ok(())
}

/// Hidden sibling of the destination, unique per upload
fn temp_path_for(file_path: &Path, filename: &str) -> PathBuf {
    file_path.with_file_name(format!(".{}.{}.tmp", filename, Uuid::new_v4().simple()))
}

/// Matches names produced by [`temp_path_for`]: `.{filename}.{32 hex}.tmp`
fn is_upload_temp_name(name: &str) -> bool {
    name.strip_prefix('.')
        .and_then(|rest| rest.strip_suffix(".tmp"))
        .and_then(|rest| rest.rsplit_once('.'))
        .is_some_and(|(filename, id)| {
            !filename.is_empty() && id.len() == 32 && id.bytes().all(|b| b.is_ascii_hexdigit())
        })
}
