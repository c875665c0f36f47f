//! Route handlers for the file server.
//!
//! Each handler decodes its typed request, runs the blocking storage
//! operation on tokio's blocking pool and turns the outcome into a reply.
//! Validation and containment live in [`crate::storage`]; nothing here
//! touches a path before the storage layer has resolved it.

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, Query, State};
use axum::response::Response;
use std::io;
use std::sync::Arc;

use crate::error::StorageError;
use crate::protocol::requests::{CreateFolderRequest, DeleteRequest, DownloadQuery, PathQuery};
use crate::protocol::responses::{ApiError, HealthResponse, MessageResponse, attachment};
use crate::server::AppState;
use crate::storage::{self, DirectoryEntry};
use crate::transfer::{open_download, store_file};

/// Multipart field carrying the uploaded file
const UPLOAD_FIELD: &str = "file";

/// `GET /health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// `GET /files?path=`
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<DirectoryEntry>>, ApiError> {
    let root = state.root.clone();
    let entries = run_blocking(move || storage::list_directory(&root, &query.path)).await?;
    Ok(Json(entries))
}

/// `GET /files/download?path=&filename=`
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let root = state.root.clone();
    let filename = query.filename.unwrap_or_default();
    let target = run_blocking(move || {
        storage::prepare_file_retrieval(&root, &query.path, &filename)
    })
    .await?;

    let stream = open_download(&target).await?;
    let content_type = mime_guess::from_path(&target.filename).first_or_octet_stream();

    Ok(attachment(
        &target.filename,
        content_type.as_ref(),
        Body::from_stream(stream),
    ))
}

/// `POST /files/upload?path=` with a multipart `file` field
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| StorageError::Validation(format!("malformed upload: {}", e.body_text())))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let root = state.root.clone();
        let path = query.path.clone();
        let filename = field.file_name().unwrap_or_default().to_string();
        let target =
            run_blocking(move || storage::prepare_file_storage(&root, &path, &filename)).await?;

        let result = store_file(target, field, state.max_upload_bytes).await?;
        return Ok(MessageResponse::new(format!(
            "{} uploaded successfully",
            result.filename
        )));
    }

    Err(StorageError::Validation("No file provided".into()).into())
}

/// `POST /files/delete?path=` with `{"filename": "..."}`
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let root = state.root.clone();
    let filename = request.filename.unwrap_or_default();
    let result =
        run_blocking(move || storage::delete_file(&root, &query.path, &filename)).await?;
    Ok(MessageResponse::new(format!("{} deleted", result.filename)))
}

/// `POST /folders/create?path=` with `{"folder_name": "..."}`
pub async fn create_folder(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PathQuery>,
    payload: Result<Json<CreateFolderRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let root = state.root.clone();
    let folder_name = request.folder_name.unwrap_or_default();
    let result =
        run_blocking(move || storage::create_folder(&root, &query.path, &folder_name)).await?;
    Ok(MessageResponse::new(format!(
        "Folder {} created",
        result.folder_name
    )))
}

/// Runs a blocking storage operation off the async workers
async fn run_blocking<T, F>(operation: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(operation)
        .await
        .map_err(|e| StorageError::Io(io::Error::other(e)))?
}

fn invalid_body(rejection: JsonRejection) -> StorageError {
    StorageError::Validation(format!("invalid request body: {}", rejection.body_text()))
}
