//! Filedock Server - Entry Point
//!
//! Serves one directory tree over HTTP: list, download, upload, delete and
//! mkdir, all confined to the configured storage root.

use log::{error, info};

use filedock_server::error::ServerError;
use filedock_server::utils::logging::setup_logging;
use filedock_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    setup_logging();

    info!("Launching file server...");

    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;
    let server = Server::new(config).await?;
    server.start().await
}
