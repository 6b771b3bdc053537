//! Error handlers
//!
//! Logs failures at the dispatch boundary and gives each one a stable code.

use crate::error::types::{DispatchError, RequestError, StorageError};
use log::{error, warn};

/// Log a dispatch error
///
/// Caller mistakes are warnings; anything touching the disk unexpectedly is an error.
pub fn handle_error(err: &DispatchError) {
    match err {
        DispatchError::Storage(StorageError::IoError(_))
        | DispatchError::Storage(StorageError::SourceRetained { .. }) => {
            error!("[{}] {}", error_code(err), err)
        }
        _ => warn!("[{}] {}", error_code(err), err),
    }
}

/// Convert error to a short machine-readable code
pub fn error_code(err: &DispatchError) -> &'static str {
    match err {
        DispatchError::Storage(e) => match e {
            StorageError::PathEscape(_) => "path_escape",
            StorageError::InvalidPath(_) => "invalid_path",
            StorageError::NotFound(_) => "not_found",
            StorageError::Conflict(_) => "conflict",
            StorageError::InvalidTarget(_) => "invalid_target",
            StorageError::Decode(_) => "decode",
            StorageError::SourceRetained { .. } => "source_retained",
            StorageError::IoError(_) => "io",
        },
        DispatchError::Request(e) => match e {
            RequestError::MalformedRequest(_) => "malformed_request",
            RequestError::Arity { .. } | RequestError::MissingArgument { .. } => "arity",
            RequestError::UnknownOperation(_) => "unknown_operation",
        },
    }
}
