//! HTTP response handling
//!
//! JSON reply bodies and the conversion from storage errors into replies.

use axum::Json;
use axum::body::Body;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::StorageError;
use crate::error::handlers::{error_to_status_code, handle_error, public_message};

/// `{"message": "..."}`
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `{"status": "ok"}`
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// A storage error on its way out as an HTTP reply
#[derive(Debug)]
pub struct ApiError(pub StorageError);

impl From<StorageError> for ApiError {
    fn from(error: StorageError) -> Self {
        ApiError(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        handle_error(&self.0);
        let body = ErrorResponse {
            error: public_message(&self.0),
        };
        (error_to_status_code(&self.0), Json(body)).into_response()
    }
}

/// Builds an attachment reply around a streamed body
pub fn attachment(filename: &str, content_type: &str, body: Body) -> Response {
    let mut response = Response::new(body);
    let headers = response.headers_mut();

    if let Ok(value) = HeaderValue::from_str(content_type) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&content_disposition(filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    response
}

/// `attachment; filename="..."`, with an RFC 5987 `filename*` for non-ASCII names
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if filename.is_ascii() && !filename.chars().any(|c| c.is_ascii_control()) {
        return format!("attachment; filename=\"{}\"", fallback);
    }

    let mut encoded = String::new();
    for byte in filename.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    )
}
