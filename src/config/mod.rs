//! Server and sync configuration.
//!
//! Loaded from a TOML file when one is given, otherwise from defaults with
//! `WATCHROOM_*` environment overrides.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid bind address {0}")]
    Address(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Path the WebSocket endpoint is mounted on.
    #[serde(default = "default_ws_path")]
    pub ws_path: String,

    /// Fallback `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    4000
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ws_path: default_ws_path(),
            log_filter: default_log_filter(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::Address(addr))
    }
}

/// Tuning shared by the server (room ids) and the client reconciler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Drift below this many seconds is left alone.
    #[serde(default = "default_seek_tolerance")]
    pub seek_tolerance_secs: f64,

    /// Length of the echo suppression window after an authoritative push.
    #[serde(default = "default_echo_window")]
    pub echo_window_ms: u64,

    #[serde(default = "default_room_id_length")]
    pub room_id_length: usize,
}

fn default_seek_tolerance() -> f64 {
    1.5
}

fn default_echo_window() -> u64 {
    1000
}

fn default_room_id_length() -> usize {
    8
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            seek_tolerance_secs: default_seek_tolerance(),
            echo_window_ms: default_echo_window(),
            room_id_length: default_room_id_length(),
        }
    }
}

impl SyncConfig {
    pub fn echo_window(&self) -> Duration {
        Duration::from_millis(self.echo_window_ms)
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Defaults, overridden by whichever `WATCHROOM_*` variables are set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("WATCHROOM_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("WATCHROOM_PORT") {
            if let Ok(port) = port.parse() {
                config.server.port = port;
            }
        }
        if let Ok(path) = std::env::var("WATCHROOM_WS_PATH") {
            config.server.ws_path = path;
        }
        if let Ok(filter) = std::env::var("WATCHROOM_LOG") {
            config.server.log_filter = filter;
        }

        config
    }

    /// Load from `path` if given, otherwise from the environment.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::from_env()),
        }
    }
}
