//! Request session
//!
//! Reads action requests line by line and writes one rendered result per request.

pub mod handler;
pub mod state;

pub use handler::run_session;
pub use state::{SessionEnd, SessionState};
