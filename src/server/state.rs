//! Shared application state
//!
//! Everything here is fixed at startup and read-only afterwards.

use std::time::Duration;

use crate::config::ServerConfig;
use crate::storage::StorageRoot;

/// Immutable state handed to every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub root: StorageRoot,
    pub max_upload_bytes: u64,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(root: StorageRoot, config: &ServerConfig) -> Self {
        Self {
            root,
            max_upload_bytes: config.max_upload_bytes(),
            request_timeout: config.request_timeout(),
        }
    }
}
