use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// The root configuration structure for the whole application.
///
/// It is built exactly once at startup (see [`crate::load_settings`]) and then
/// handed by reference to whichever component needs a slice of it.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub client: ClientSettings,
    pub logging: LogSettings,
}

/// Where the SQLite store lives and how the pool talks to it.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Path of the SQLite database file. Created on first connect if missing.
    pub path: PathBuf,
    pub max_connections: u32,
    /// Upper bound on waiting for a pooled connection, in seconds.
    pub connect_timeout_secs: u64,
}

impl DatabaseSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Bind address and per-request limits of the HTTP API.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl ServerSettings {
    /// The `host:port` string handed to the TCP listener.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Settings for the command-line client.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    /// Base URL of a running API instance, e.g. `http://localhost:5000`.
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    /// An `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
    /// When set, logs go to a daily rolling file in this directory instead of stderr.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum LogFormat {
    /// Human-readable, one line per event.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl Settings {
    /// Rejects values that deserialize fine but can never work at runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.path must not be empty".to_string(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be a non-zero port number".to_string(),
            ));
        }
        if !(self.client.base_url.starts_with("http://")
            || self.client.base_url.starts_with("https://"))
        {
            return Err(ConfigError::ValidationError(format!(
                "client.base_url must be an http(s) URL, got '{}'",
                self.client.base_url
            )));
        }
        Ok(())
    }
}
