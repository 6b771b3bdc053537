//! Configuration management for the file operations engine
//!
//! Values come from built-in defaults, then an optional `config.toml`, then
//! `FILEOPS_*` environment variables. Everything is read once at startup.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

use crate::protocol::ResponseLimits;
use crate::storage::operations::DEFAULT_MAX_RETRIES;

/// Engine configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Folder every operation is confined to; created if missing
    /// Environment: FILEOPS_STORAGE_ROOT
    pub storage_root: String,

    /// Longest request line accepted by the session loop, in bytes
    pub max_request_length: usize,

    /// Attempts for filesystem calls that fail with a transient permission error
    pub max_retries: usize,

    /// Spoken summary limits
    pub read_preview_chars: usize,
    pub list_preview_entries: usize,
    pub search_preview_entries: usize,
}

impl EngineConfig {
    /// Load configuration from ./config.toml (if present) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name("config").required(false))
    }

    /// Load configuration from an explicit file, which must exist
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Self::build(File::with_name(path).required(true))
    }

    fn build<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let limits = ResponseLimits::default();
        let settings = Config::builder()
            .set_default("storage_root", "artifacts")?
            .set_default("max_request_length", 512_i64)?
            .set_default("max_retries", DEFAULT_MAX_RETRIES as i64)?
            .set_default("read_preview_chars", limits.read_preview_chars as i64)?
            .set_default("list_preview_entries", limits.list_preview_entries as i64)?
            .set_default("search_preview_entries", limits.search_preview_entries as i64)?
            .add_source(file)
            .add_source(Environment::with_prefix("FILEOPS"))
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_root.trim().is_empty() {
            return Err(ConfigError::Message("storage_root cannot be empty".into()));
        }

        if self.max_request_length == 0 {
            return Err(ConfigError::Message(
                "max_request_length must be greater than 0".into(),
            ));
        }

        if self.max_retries == 0 {
            return Err(ConfigError::Message(
                "max_retries must be at least 1".into(),
            ));
        }

        if self.read_preview_chars == 0
            || self.list_preview_entries == 0
            || self.search_preview_entries == 0
        {
            return Err(ConfigError::Message(
                "preview limits must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Get storage root as PathBuf
    pub fn storage_root_path(&self) -> PathBuf {
        PathBuf::from(&self.storage_root)
    }

    pub fn response_limits(&self) -> ResponseLimits {
        ResponseLimits {
            read_preview_chars: self.read_preview_chars,
            list_preview_entries: self.list_preview_entries,
            search_preview_entries: self.search_preview_entries,
        }
    }
}
