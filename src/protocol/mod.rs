//! Action request protocol
//!
//! Parses `operation:arguments` requests, routes them to the storage engine
//! and shapes the outcome for speech feedback.

pub mod commands;
pub mod handlers;
pub mod parser;
pub mod responses;

pub use commands::Operation;
pub use handlers::{Dispatcher, ResponseLimits};
pub use parser::{ActionRequest, parse_request};
pub use responses::{OperationResult, ResultData};
