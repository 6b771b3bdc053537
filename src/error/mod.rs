//! Error handling
//!
//! Defines error types and handling for the file operations engine.

pub mod handlers;
pub mod types;

pub use types::*;
