//! Transfer module
//!
//! Streams file content in and out of the storage root.

pub mod file_ops;

pub use file_ops::{open_download, store_file};
