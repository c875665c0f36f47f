//! HTTP protocol implementation
//!
//! Route table, typed requests and JSON replies for the file server.

pub mod handlers;
pub mod requests;
pub mod responses;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;

use crate::middleware::logging::log_request;
use crate::server::AppState;

pub use requests::{CreateFolderRequest, DeleteRequest, DownloadQuery, PathQuery};
pub use responses::{ApiError, ErrorResponse, HealthResponse, MessageResponse};

/// Builds the application router over shared state
pub fn router(state: Arc<AppState>) -> Router {
    let request_timeout = state.request_timeout;

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/files", get(handlers::list_files))
        .route("/files/download", get(handlers::download_file))
        // Size is enforced while streaming to disk instead
        .route(
            "/files/upload",
            post(handlers::upload_file).layer(DefaultBodyLimit::disable()),
        )
        .route("/files/delete", post(handlers::delete_file))
        .route("/folders/create", post(handlers::create_folder))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(log_request))
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}
