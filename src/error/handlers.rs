//! Error handlers
//!
//! Maps storage errors onto HTTP status codes and caller-facing messages.

use axum::http::StatusCode;
use log::{debug, error, warn};

use crate::error::types::StorageError;

/// Log a storage error at a level matching its severity
pub fn handle_error(err: &StorageError) {
    match err {
        StorageError::Io(e) => error!("Storage I/O failure: {}", e),
        StorageError::Containment(input) => {
            warn!("Rejected path outside storage root: {:?}", input)
        }
        other => debug!("Request rejected: {}", other),
    }
}

/// Convert error to HTTP status code
pub fn error_to_status_code(err: &StorageError) -> StatusCode {
    match err {
        StorageError::Validation(_) => StatusCode::BAD_REQUEST,
        StorageError::Containment(_) => StatusCode::BAD_REQUEST,
        StorageError::TypeMismatch { .. } => StatusCode::BAD_REQUEST,
        StorageError::NotFound(_) => StatusCode::NOT_FOUND,
        StorageError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        StorageError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Short reason returned to the caller.
///
/// Containment failures and I/O errors are reported generically; their details
/// only go to the log.
pub fn public_message(err: &StorageError) -> String {
    match err {
        StorageError::Containment(_) => "invalid path".to_string(),
        StorageError::Io(_) => "internal storage error".to_string(),
        StorageError::PayloadTooLarge(max) => format!("file too large (max {} bytes)", max),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            error_to_status_code(&StorageError::Validation("filename required".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_to_status_code(&StorageError::Containment("../etc".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_to_status_code(&StorageError::NotFound("/a.txt".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_to_status_code(&StorageError::not_a_directory("/a.txt")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_to_status_code(&StorageError::PayloadTooLarge(10)),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            error_to_status_code(&StorageError::Io(io::Error::other("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_containment_message_hides_input() {
        let err = StorageError::Containment("../../etc/passwd".into());
        let message = public_message(&err);
        assert_eq!(message, "invalid path");
        assert!(!message.contains("etc"));
    }

    #[test]
    fn test_io_message_is_generic() {
        let err = StorageError::Io(io::Error::other("/srv/files/secret: permission denied"));
        assert_eq!(public_message(&err), "internal storage error");
    }

    #[test]
    fn test_type_mismatch_message() {
        assert_eq!(
            public_message(&StorageError::not_a_file("/docs")),
            "/docs is not a file"
        );
        assert_eq!(
            public_message(&StorageError::not_a_directory("/a.txt")),
            "/a.txt is not a directory"
        );
    }
}
