//! File system storage management
//!
//! Handles path containment and the file operations built on top of it.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

pub use operations::{
    create_folder, delete_file, list_directory, prepare_file_retrieval, prepare_file_storage,
};
pub use results::{DirectoryEntry, DownloadTarget, EntryKind, UploadResult, UploadTarget};
pub use validation::{StorageRoot, resolve};
