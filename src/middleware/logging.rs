//! Logging middleware
//!
//! Provides request logging functionality.

use log::{debug, info, warn};

use crate::protocol::OperationResult;

/// Log an inbound request
pub fn log_request(session: &str, request: &str) {
    info!("Session {} requested: {}", session, request);
}

/// Log the outcome of a request
///
/// Failures were already logged with their error code by the dispatcher.
pub fn log_result(session: &str, result: &OperationResult) {
    let status = if result.success { "+OK" } else { "-ERR" };
    debug!("Session {} responded {} {}", session, status, result.message);
}

/// Log a line that never reached the parser
pub fn log_rejected(session: &str, reason: &str) {
    warn!("Session {} rejected input: {}", session, reason);
}
