//! Storage result types
//!
//! Defines result structures returned by storage operations.

/// Result of a write or append
#[derive(Debug, Clone, PartialEq)]
pub struct WriteResult {
    pub path: String,
    pub bytes_written: usize,
    pub created: bool,
}

/// Result of a find-and-replace edit
#[derive(Debug, Clone, PartialEq)]
pub struct EditResult {
    pub path: String,
    pub replacements: usize,
}

/// Result of a copy or move
#[derive(Debug, Clone, PartialEq)]
pub struct TransferResult {
    pub source: String,
    pub destination: String,
}

/// Result of creating a directory
#[derive(Debug, Clone, PartialEq)]
pub struct CreateDirectoryResult {
    pub path: String,
    /// False when the directory was already there
    pub created: bool,
}

/// Metadata for a single entry
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub name: String,
    pub path: String,
    pub size: u64,
    /// Seconds since the unix epoch, 0 when unavailable
    pub modified: u64,
    pub is_directory: bool,
}
