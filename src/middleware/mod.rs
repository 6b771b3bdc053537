//! Session middleware
//!
//! Provides request logging.

pub mod logging;
