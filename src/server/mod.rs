//! Server core functionality
//!
//! Startup, shared state and the accept loop.

pub mod core;
pub mod state;

pub use self::core::Server;
pub use state::AppState;
