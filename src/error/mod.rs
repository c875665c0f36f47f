//! Error handling
//!
//! Defines error types and their mapping onto HTTP replies.

pub mod handlers;
pub mod types;

pub use types::*;
