pub mod config;
pub mod error;
pub mod middleware;
pub mod protocol;
pub mod session;
pub mod storage;
pub mod utils;

pub use config::EngineConfig;
pub use protocol::{Dispatcher, OperationResult};
pub use storage::{FileOperations, StorageRoot};
