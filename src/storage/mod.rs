//! File system storage management
//!
//! Handles path containment, file operations and their result types.

pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

pub use operations::FileOperations;
pub use validation::StorageRoot;
