//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::Env;

/// Setup logging for the server.
///
/// Honors `RUST_LOG`; defaults to `info` when it is unset.
pub fn setup_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
}
