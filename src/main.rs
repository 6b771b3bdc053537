//! Sandboxed file operations engine - Entry Point
//!
//! Reads `operation:arguments` requests from stdin and answers each on stdout.

use log::{error, info};
use std::process;
use std::sync::Arc;
use tokio::io::{self, BufReader};

use sandbox_fileops::config::EngineConfig;
use sandbox_fileops::protocol::Dispatcher;
use sandbox_fileops::session::run_session;
use sandbox_fileops::storage::{FileOperations, StorageRoot};
use sandbox_fileops::utils::logging::setup_logging;

#[tokio::main]
async fn main() {
    setup_logging();

    let config = match EngineConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let root = match StorageRoot::open(config.storage_root_path()) {
        Ok(root) => root,
        Err(e) => {
            error!("Cannot open storage root {}: {}", config.storage_root, e);
            process::exit(1);
        }
    };
    info!("Storage root: {}", root.path().display());

    let files = FileOperations::new(root).with_max_retries(config.max_retries);
    let dispatcher = Arc::new(Dispatcher::new(files, config.response_limits()));

    let session = run_session(
        BufReader::new(io::stdin()),
        io::stdout(),
        dispatcher,
        config.max_request_length,
        "stdin",
    );

    tokio::select! {
        result = session => {
            if let Err(e) = result {
                error!("Session aborted: {}", e);
                process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }
}
