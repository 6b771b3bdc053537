//! Error types
//!
//! Defines domain-specific error types for the storage engine and the request layer.

use std::fmt;
use std::io;

/// Storage module errors
///
/// Paths carried by the variants are the user-facing relative paths, never the
/// absolute location on disk.
#[derive(Debug)]
pub enum StorageError {
    PathEscape(String),
    InvalidPath(String),
    NotFound(String),
    Conflict(String),
    InvalidTarget(String),
    Decode(String),
    SourceRetained {
        source: String,
        destination: String,
        error: io::Error,
    },
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::PathEscape(p) => {
                write!(f, "Access denied: {} is outside the storage folder", p)
            }
            StorageError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StorageError::NotFound(p) => write!(f, "Not found: {}", p),
            StorageError::Conflict(p) => write!(f, "Already exists: {}", p),
            StorageError::InvalidTarget(msg) => write!(f, "{}", msg),
            StorageError::Decode(p) => write!(f, "{} is not a text file", p),
            StorageError::SourceRetained {
                source,
                destination,
                error,
            } => write!(
                f,
                "Copied {} to {} but could not remove the original: {}",
                source, destination, error
            ),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

impl StorageError {
    /// Maps an I/O failure on `path` into the structured taxonomy.
    pub fn from_io(error: io::Error, path: &str) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path.to_string()),
            io::ErrorKind::AlreadyExists => StorageError::Conflict(path.to_string()),
            io::ErrorKind::NotADirectory => {
                StorageError::InvalidTarget(format!("{} is inside a file, not a folder", path))
            }
            io::ErrorKind::IsADirectory => {
                StorageError::InvalidTarget(format!("{} is a folder, not a file", path))
            }
            io::ErrorKind::InvalidData => StorageError::Decode(path.to_string()),
            _ => StorageError::IoError(error),
        }
    }
}

/// Request parsing and dispatch errors
#[derive(Debug, PartialEq)]
pub enum RequestError {
    MalformedRequest(String),
    Arity {
        operation: String,
        expected: String,
        got: usize,
    },
    MissingArgument {
        operation: String,
        argument: &'static str,
    },
    UnknownOperation(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MalformedRequest(msg) => write!(f, "Malformed request: {}", msg),
            RequestError::Arity {
                operation,
                expected,
                got,
            } => write!(
                f,
                "{} takes {} arguments, got {}",
                operation, expected, got
            ),
            RequestError::MissingArgument {
                operation,
                argument,
            } => write!(f, "No {} specified for {}", argument, operation),
            RequestError::UnknownOperation(op) => write!(f, "Unknown operation: {}", op),
        }
    }
}

impl std::error::Error for RequestError {}

/// Umbrella error for everything that can go wrong handling one action request
#[derive(Debug)]
pub enum DispatchError {
    Request(RequestError),
    Storage(StorageError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Request(e) => write!(f, "{}", e),
            DispatchError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<RequestError> for DispatchError {
    fn from(error: RequestError) -> Self {
        DispatchError::Request(error)
    }
}

impl From<StorageError> for DispatchError {
    fn from(error: StorageError) -> Self {
        DispatchError::Storage(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_map_to_taxonomy() {
        let err = StorageError::from_io(io::Error::from(io::ErrorKind::NotFound), "a.txt");
        assert!(matches!(err, StorageError::NotFound(ref p) if p == "a.txt"));

        let err = StorageError::from_io(io::Error::from(io::ErrorKind::AlreadyExists), "a.txt");
        assert!(matches!(err, StorageError::Conflict(_)));

        let err = StorageError::from_io(io::Error::from(io::ErrorKind::InvalidData), "a.bin");
        assert!(matches!(err, StorageError::Decode(_)));

        let err = StorageError::from_io(io::Error::from(io::ErrorKind::PermissionDenied), "a");
        assert!(matches!(err, StorageError::IoError(_)));
    }

    #[test]
    fn test_messages_name_the_path() {
        assert_eq!(
            StorageError::NotFound("notes.txt".into()).to_string(),
            "Not found: notes.txt"
        );
        assert_eq!(
            RequestError::UnknownOperation("fly".into()).to_string(),
            "Unknown operation: fly"
        );
    }
}
