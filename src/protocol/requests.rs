//! Typed request parameters
//!
//! Query strings and JSON bodies are decoded into these structs before any
//! validation happens. Required fields stay optional here; the storage layer
//! decides what "missing" means and reports it as a validation error.

use serde::Deserialize;

/// `?path=` on every file route. Absent means the storage root.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

/// `GET /files/download?path=&filename=`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub path: String,
    pub filename: Option<String>,
}

/// JSON body of `POST /files/delete`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DeleteRequest {
    pub filename: Option<String>,
}

/// JSON body of `POST /folders/create`
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CreateFolderRequest {
    pub folder_name: Option<String>,
}
