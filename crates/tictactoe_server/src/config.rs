//! Server configuration.
//!
//! Values are layered: built-in defaults, then the TOML file, then
//! environment variables, then command-line flags.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Config file read when no path is given, if it exists.
pub const DEFAULT_CONFIG_FILE: &str = "tictactoe.toml";

/// Configuration for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    port: u16,

    /// Path of the SQLite database file.
    #[serde(default = "default_database_url")]
    database_url: String,

    /// Tracing filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    log_filter: String,
}

#[instrument]
fn default_host() -> String {
    "127.0.0.1".to_string()
}

#[instrument]
fn default_port() -> u16 {
    8080
}

#[instrument]
fn default_database_url() -> String {
    "tictactoe.db".to_string()
}

#[instrument]
fn default_log_filter() -> String {
    "info,tictactoe_server=debug,tictactoe_engine=info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            log_filter: default_log_filter(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the text is not valid configuration.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        info!(host = %config.host, port = config.port, "Config loaded successfully");
        Ok(config)
    }

    /// Resolves the file layer: the given path, else [`DEFAULT_CONFIG_FILE`]
    /// if present, else defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an existing file is unreadable or invalid.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Applies `TICTACTOE_HOST`, `TICTACTOE_PORT` and `DATABASE_URL`.
    #[instrument(skip(self))]
    pub fn apply_env(self) -> Self {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = var("TICTACTOE_HOST") {
            self.host = host;
        }
        if let Some(port) = var("TICTACTOE_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(e) => warn!(value = %port, error = %e, "Ignoring invalid TICTACTOE_PORT"),
            }
        }
        if let Some(url) = var("DATABASE_URL") {
            self.database_url = url;
        }
        self
    }

    /// Applies command-line overrides.
    pub fn with_overrides(
        mut self,
        host: Option<String>,
        port: Option<u16>,
        database_url: Option<String>,
    ) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(url) = database_url {
            self.database_url = url;
        }
        self
    }

    /// `host:port` for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = ServerConfig::from_toml("port = 9000").unwrap();
        assert_eq!(*config.port(), 9000);
        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.database_url(), "tictactoe.db");
        assert_eq!(config.log_filter(), "info,tictactoe_server=debug,tictactoe_engine=info");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let err = ServerConfig::from_toml("port = \"eighty\"").unwrap_err();
        assert!(err.message.contains("Failed to parse config"));
    }

    #[test]
    fn test_env_then_flags_override() {
        let vars: HashMap<&str, &str> = [("TICTACTOE_PORT", "7000"), ("DATABASE_URL", "env.db")]
            .into_iter()
            .collect();
        let config = ServerConfig::default()
            .apply_vars(|key| vars.get(key).map(|v| v.to_string()))
            .with_overrides(None, None, Some("cli.db".to_string()));
        assert_eq!(*config.port(), 7000);
        assert_eq!(config.database_url(), "cli.db");
        assert_eq!(config.bind_address(), "127.0.0.1:7000");
    }

    #[test]
    fn test_invalid_env_port_is_ignored() {
        let config = ServerConfig::default()
            .apply_vars(|key| (key == "TICTACTOE_PORT").then(|| "not-a-port".to_string()));
        assert_eq!(*config.port(), 8080);
    }

    #[test]
    fn test_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "host = \"0.0.0.0\"\ndatabase_url = \"games.db\"\n").unwrap();
        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.database_url(), "games.db");
    }
}
