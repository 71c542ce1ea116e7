//! Configuration types.
//!
//! Every section is optional in the file; missing sections and keys fall
//! back to their `Default` impls.

use std::path::PathBuf;

use serde::Deserialize;

use crate::{ConfigError, Result};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 7300;

/// Default bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Default database file name inside the data directory.
pub const DEFAULT_DATABASE_FILE: &str = "coex.db";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CoexConfig {
    pub server: Option<ServerConfig>,
    pub database: Option<DatabaseConfig>,
    pub kubernetes: Option<KubernetesConfig>,
    pub debug: Option<DebugConfig>,
    pub logging: Option<LoggingConfig>,
}

impl CoexConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Sections replace each other wholesale.
    pub fn merge(&mut self, other: CoexConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.kubernetes.is_some() {
            self.kubernetes = other.kubernetes;
        }
        if other.debug.is_some() {
            self.debug = other.debug;
        }
        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn database(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }

    pub fn kubernetes(&self) -> KubernetesConfig {
        self.kubernetes.clone().unwrap_or_default()
    }

    pub fn debug(&self) -> DebugConfig {
        self.debug.clone().unwrap_or_default()
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        let debug = self.debug();
        if debug.max_sessions == 0 {
            return Err(invalid("debug.max_sessions", "must be at least 1"));
        }
        if debug.channel_capacity == 0 {
            return Err(invalid("debug.channel_capacity", "must be at least 1"));
        }
        if self.kubernetes().request_timeout_secs == 0 {
            return Err(invalid("kubernetes.request_timeout_secs", "must be at least 1"));
        }
        if let Some(url) = &self.server().public_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(invalid("server.public_url", "must be an http or https url"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: u16,
    /// Address to bind to.
    pub bind: String,
    /// Base URL workloads use to reach this service. Derived from bind and
    /// port when unset.
    pub public_url: Option<String>,
    /// Enable request logging.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
            public_url: None,
            request_logging: true,
        }
    }
}

impl ServerConfig {
    /// Base URL injected into workloads for event callbacks.
    pub fn service_url(&self) -> String {
        match &self.public_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.bind, self.port),
        }
    }
}

/// `[database]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file. Defaults to `coex.db` in the platform data directory.
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => path.clone(),
            None => dirs::data_dir()
                .map(|d| d.join("coex").join(DEFAULT_DATABASE_FILE))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_FILE)),
        }
    }
}

/// `[kubernetes]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KubernetesConfig {
    /// Bearer token sent to every API server.
    pub token: Option<String>,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
}

impl Default for KubernetesConfig {
    fn default() -> Self {
        Self {
            token: None,
            request_timeout_secs: 30,
        }
    }
}

/// `[debug]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Live debug sessions before the least recently used is evicted.
    pub max_sessions: usize,
    /// Idle WebSocket connections are closed after this many seconds.
    pub idle_timeout_secs: u64,
    /// Buffered notifications per session.
    pub channel_capacity: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            max_sessions: 50,
            idle_timeout_secs: 600,
            channel_capacity: 32,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Console filter directive, e.g. `info` or `coex=debug`.
    pub level: Option<String>,
    /// Directory for the JSON log file. Defaults to the platform data
    /// directory.
    pub directory: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn resolved_directory(&self) -> PathBuf {
        match &self.directory {
            Some(dir) => dir.clone(),
            None => dirs::data_dir()
                .map(|d| d.join("coex").join("logs"))
                .unwrap_or_else(|| PathBuf::from("logs")),
        }
    }
}
