//! Module `file_ops`
//!
//! Moves file content between the storage root and HTTP bodies. Uploads are
//! streamed into a temporary sibling and renamed into place on completion, so
//! a reader never observes a half-written file. Downloads are streamed in
//! fixed-size chunks rather than loaded into memory.

use futures_util::{Stream, StreamExt};
use log::{error, info, warn};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;

use crate::error::StorageError;
use crate::storage::{DownloadTarget, UploadResult, UploadTarget};

const BUFFER_SIZE: usize = 8192;

/// Streams `chunks` into the upload target, replacing any existing file.
///
/// Fails with [`StorageError::PayloadTooLarge`] as soon as more than
/// `max_bytes` arrive. The temporary file is removed on every failure path,
/// including when this future is dropped before completion (client disconnect
/// or request timeout).
pub async fn store_file<S, B, E>(
    target: UploadTarget,
    chunks: S,
    max_bytes: u64,
) -> Result<UploadResult, StorageError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    info!(
        "Starting file upload: {} -> {}",
        target.temp_path.display(),
        target.virtual_path
    );

    let temp_guard = TempFileGuard::new(&target.temp_path);

    let bytes_written = write_chunks(&target.temp_path, chunks, max_bytes).await?;

    if let Err(e) = fs::rename(&target.temp_path, &target.final_path).await {
        error!(
            "Failed to move upload into place for {}: {}",
            target.virtual_path, e
        );
        return Err(StorageError::Io(e));
    }
    temp_guard.disarm();

    info!(
        "File upload completed successfully: {} ({} bytes)",
        target.virtual_path, bytes_written
    );

    Ok(UploadResult {
        filename: target.filename,
        virtual_path: target.virtual_path,
        bytes_written,
    })
}

/// Opens a validated file as a chunked byte stream
pub async fn open_download(target: &DownloadTarget) -> Result<ReaderStream<File>, StorageError> {
    let file = File::open(&target.path).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            // Removed between validation and open
            StorageError::NotFound(target.virtual_path.clone())
        } else {
            error!("Failed to open file {}: {}", target.virtual_path, e);
            StorageError::Io(e)
        }
    })?;

    info!(
        "Starting file download: {} ({} bytes)",
        target.virtual_path, target.size
    );

    Ok(ReaderStream::with_capacity(file, BUFFER_SIZE))
}

async fn write_chunks<S, B, E>(temp_path: &Path, chunks: S, max_bytes: u64) -> Result<u64, StorageError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let mut temp_file = File::create(temp_path).await.map_err(|e| {
        error!("Failed to create temporary file {}: {}", temp_path.display(), e);
        StorageError::Io(e)
    })?;

    let mut chunks = std::pin::pin!(chunks);
    let mut total_bytes_received = 0u64;

    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(|e| {
            let e: Box<dyn std::error::Error + Send + Sync> = e.into();
            warn!("Upload stream aborted: {}", e);
            StorageError::Io(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "upload stream aborted",
            ))
        })?;
        let chunk = chunk.as_ref();

        // Check the limit before writing (fail fast)
        total_bytes_received += chunk.len() as u64;
        if total_bytes_received > max_bytes {
            warn!(
                "Upload size limit exceeded: {} bytes > {} bytes",
                total_bytes_received, max_bytes
            );
            return Err(StorageError::PayloadTooLarge(max_bytes));
        }

        temp_file.write_all(chunk).await?;
    }

    temp_file.flush().await?;

    Ok(total_bytes_received)
}

/// Removes the upload's temporary file when dropped, unless disarmed after
/// the rename. Runs on error returns and on cancellation alike.
struct TempFileGuard {
    path: Option<PathBuf>,
}

impl TempFileGuard {
    fn new(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    fn disarm(mut self) {
        self.path = None;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        // Drop cannot await
        if let Err(e) = std::fs::remove_file(&path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!("Failed to remove temporary file {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{StorageRoot, prepare_file_retrieval, prepare_file_storage};
    use futures_util::stream;
    use tempfile::TempDir;

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Result<&'static [u8], io::Error>> {
        let parts: Vec<Result<&'static [u8], io::Error>> =
            parts.iter().map(|part| Ok(part.as_bytes())).collect();
        stream::iter(parts)
    }

    fn temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[tokio::test]
    async fn test_upload_then_download_round_trip() {
        let dir = TempDir::new().unwrap();
        let root = StorageRoot::open(dir.path()).unwrap();

        let target = prepare_file_storage(&root, "in", "data.bin").unwrap();
        let result = store_file(target, chunks(&["abc", "", "defg"]), 1024)
            .await
            .unwrap();
        assert_eq!(result.bytes_written, 7);
        assert_eq!(result.filename, "data.bin");

        let download = prepare_file_retrieval(&root, "in", "data.bin").unwrap();
        let mut stream = open_download(&download).await.unwrap();
        let mut content = Vec::new();
        while let Some(chunk) = stream.next().await {
            content.extend_from_slice(&chunk.unwrap());
        }
        assert_eq!(content, b"abcdefg");
        assert!(temp_files(&root.path().join("in")).is_empty());
    }

    #[tokio::test]
    async fn test_upload_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let root = StorageRoot::open(dir.path()).unwrap();
        std::fs::write(root.path().join("same.txt"), b"old content").unwrap();

        let target = prepare_file_storage(&root, "", "same.txt").unwrap();
        store_file(target, chunks(&["new"]), 1024).await.unwrap();

        assert_eq!(std::fs::read(root.path().join("same.txt")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_upload_over_limit_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let root = StorageRoot::open(dir.path()).unwrap();

        let target = prepare_file_storage(&root, "", "big.bin").unwrap();
        let err = store_file(target, chunks(&["12345", "67890"]), 8)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::PayloadTooLarge(8)));
        assert!(!root.path().join("big.bin").exists());
        assert!(temp_files(root.path()).is_empty());
    }

    #[tokio::test]
    async fn test_aborted_stream_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let root = StorageRoot::open(dir.path()).unwrap();

        let target = prepare_file_storage(&root, "", "partial.bin").unwrap();
        let parts: Vec<Result<&[u8], io::Error>> = vec![
            Ok("first".as_bytes()),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset")),
        ];
        let err = store_file(target, stream::iter(parts), 1024)
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Io(_)));
        assert!(!root.path().join("partial.bin").exists());
        assert!(temp_files(root.path()).is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_upload_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let root = StorageRoot::open(dir.path()).unwrap();

        let target = prepare_file_storage(&root, "", "big.bin").unwrap();
        let temp_path = target.temp_path.clone();
        let stalled = chunks(&["partial"]).chain(stream::pending());

        let upload = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            store_file(target, stalled, 1024 * 1024),
        )
        .await;

        assert!(upload.is_err());
        assert!(!temp_path.exists());
        assert!(!root.path().join("big.bin").exists());
        assert!(temp_files(root.path()).is_empty());
    }
}
