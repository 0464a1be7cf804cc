//! Configuration storage abstraction.
//!
//! Settings are a small JSON document (`settings.json`). Every field is
//! optional; accessors fill in defaults so an empty or missing file yields a
//! working server.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
/// Default public prefix for media files.
pub const DEFAULT_MEDIA_URL: &str = "/media/";
/// Default delay between two polls of a station stream.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
/// Default upper bound for the poll interval.
pub const DEFAULT_MAX_POLL_INTERVAL_SECS: u64 = 300;
/// Default per-stream output buffer.
pub const DEFAULT_STREAM_BUFFER: usize = 16;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested configuration was not found.
    #[error("Configuration not found: {0}")]
    NotFound(String),
    /// Failed to read configuration.
    #[error("Read error: {0}")]
    ReadError(String),
    /// Failed to write configuration.
    #[error("Write error: {0}")]
    WriteError(String),
    /// Configuration data is invalid.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Abstract configuration storage.
///
/// All methods are synchronous; async wrappers belong to the framework layer.
pub trait ConfigStorage: Send + Sync {
    /// Load server settings.
    fn load_settings(&self) -> Result<ServerSettings, ConfigError>;

    /// Save server settings.
    fn save_settings(&self, settings: &ServerSettings) -> Result<(), ConfigError>;
}

/// Server settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    /// HTTP listen address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_addr: Option<String>,

    /// Public URL prefix used to resolve stored file references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,

    /// Seconds between two polls of a station stream.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,

    /// Upper bound applied to `poll_interval_secs`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_poll_interval_secs: Option<u64>,

    /// Capacity of each stream's output channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_buffer: Option<usize>,

    /// JSON dataset loaded into the in-memory store on start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_file: Option<PathBuf>,
}

impl ServerSettings {
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    pub fn media_url(&self) -> &str {
        self.media_url.as_deref().unwrap_or(DEFAULT_MEDIA_URL)
    }

    /// Effective poll interval, clamped to `[1s, max_poll_interval]`.
    pub fn poll_interval(&self) -> Duration {
        let max = self
            .max_poll_interval_secs
            .unwrap_or(DEFAULT_MAX_POLL_INTERVAL_SECS)
            .max(1);
        let secs = self
            .poll_interval_secs
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .clamp(1, max);
        Duration::from_secs(secs)
    }

    pub fn stream_buffer(&self) -> usize {
        self.stream_buffer.unwrap_or(DEFAULT_STREAM_BUFFER).max(1)
    }
}

/// File-backed settings storage (`settings.json`).
#[derive(Debug, Clone)]
pub struct FileConfigStorage {
    path: PathBuf,
}

impl FileConfigStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, falling back to defaults when the file does not exist.
    pub fn load_or_default(&self) -> Result<ServerSettings, ConfigError> {
        match self.load_settings() {
            Err(ConfigError::NotFound(_)) => Ok(ServerSettings::default()),
            other => other,
        }
    }
}

impl ConfigStorage for FileConfigStorage {
    fn load_settings(&self) -> Result<ServerSettings, ConfigError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(self.path.display().to_string())
            } else {
                ConfigError::ReadError(e.to_string())
            }
        })?;
        serde_json::from_str(&text).map_err(|e| ConfigError::InvalidData(e.to_string()))
    }

    fn save_settings(&self, settings: &ServerSettings) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        std::fs::write(&self.path, json).map_err(|e| ConfigError::WriteError(e.to_string()))
    }
}
