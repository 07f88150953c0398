//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub hub: HubSettings,

    #[serde(default)]
    pub broadcast: BroadcastConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listening endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Connection hub limits
#[derive(Debug, Clone, Deserialize)]
pub struct HubSettings {
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

fn default_max_connections() -> usize {
    1000
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
        }
    }
}

/// Heartbeat broadcast configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_heartbeat_enabled")]
    pub heartbeat_enabled: bool,

    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
}

fn default_heartbeat_enabled() -> bool {
    true
}

fn default_heartbeat_interval() -> u64 {
    1
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            heartbeat_enabled: default_heartbeat_enabled(),
            heartbeat_interval_secs: default_heartbeat_interval(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from `./config.toml` if present, otherwise environment only
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = PathBuf::from("./config.toml");
        if path.exists() {
            let config = Self::load_with_env(&path)?;
            tracing::info!("Loaded config from {:?}", path);
            return Ok(config);
        }

        tracing::info!("Using default config with environment overrides");
        Ok(Self::from_env())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("BEACON_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("BEACON_PORT") {
            if let Ok(p) = port.parse() {
                self.server.port = p;
            }
        }

        if let Ok(max) = std::env::var("BEACON_MAX_CONNECTIONS") {
            if let Ok(m) = max.parse() {
                self.hub.max_connections = m;
            }
        }

        if let Ok(enabled) = std::env::var("BEACON_HEARTBEAT_ENABLED") {
            self.broadcast.heartbeat_enabled =
                enabled.to_lowercase() != "false" && enabled != "0";
        }
        if let Ok(interval) = std::env::var("BEACON_HEARTBEAT_INTERVAL_SECS") {
            if let Ok(i) = interval.parse() {
                self.broadcast.heartbeat_interval_secs = i;
            }
        }

        if let Ok(level) = std::env::var("BEACON_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("BEACON_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(config.hub.max_connections, 1000);
        assert!(config.broadcast.heartbeat_enabled);
        assert_eq!(config.broadcast.heartbeat_interval_secs, 1);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 9000

            [broadcast]
            heartbeat_interval_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.broadcast.heartbeat_interval_secs, 5);
        assert!(config.broadcast.heartbeat_enabled);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Config::load(Path::new("/nonexistent/beacon.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
