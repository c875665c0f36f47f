use log::info;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::protocol::router;
use crate::server::state::AppState;
use crate::storage::StorageRoot;

pub struct Server {
    listener: TcpListener,
    state: Arc<AppState>,
}

impl Server {
    /// Prepares the storage root and binds the listener.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let root_path = config.storage_root_path();
        let root = StorageRoot::create(&root_path).map_err(|source| ServerError::StorageRoot {
            path: root_path.clone(),
            source,
        })?;
        info!("Storage root directory: {}", root.path().display());

        let addr = config.socket_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!("Server bound to {}", addr);

        Ok(Self {
            listener,
            state: Arc::new(AppState::new(root, &config)),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        info!(
            "Starting file server on {} (root {}, max upload {} bytes)",
            self.local_addr()?,
            self.state.root.path().display(),
            self.state.max_upload_bytes
        );

        // Each connection is driven on its own task
        axum::serve(self.listener, router(self.state)).await?;
        Ok(())
    }
}
