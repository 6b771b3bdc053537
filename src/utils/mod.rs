//! Utility functions
//!
//! Provides logging setup and input validation helpers.

pub mod logging;
pub mod validation;
