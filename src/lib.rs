pub mod config;
pub mod error;
pub mod middleware;
pub mod protocol;
pub mod server;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use config::ServerConfig;
pub use server::{AppState, Server};
