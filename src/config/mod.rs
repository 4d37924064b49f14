//! Configuration file handling for kindling
//!
//! This module contains the data structures for `config.toml`:
//! - top-level keys `auto_install` and `backend`
//! - the `[daemon]` table, also rendered on its own as the daemon's config file

pub mod store;

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KindlingError, Result};

pub use store::ConfigStore;

/// Default telemetry endpoint (a local Vector HTTP source)
pub const DEFAULT_ENDPOINT_URL: &str = "http://localhost:8686";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root of `config.toml`
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_install: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daemon: Option<DaemonConfig>,
}

impl Config {
    pub fn backend(&self) -> Backend {
        self.backend.unwrap_or_default()
    }

    pub fn daemon_or_default(&self) -> DaemonConfig {
        self.daemon.clone().unwrap_or_default()
    }
}

/// Which nix-installer distribution to download
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Upstream,
    Determinate,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::Upstream, Backend::Determinate];
}

impl FromStr for Backend {
    type Err = KindlingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "upstream" => Ok(Backend::Upstream),
            "determinate" => Ok(Backend::Determinate),
            other => Err(KindlingError::InvalidBackend {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Upstream => write!(f, "upstream"),
            Backend::Determinate => write!(f, "determinate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
    #[serde(default = "default_grpc_addr")]
    pub grpc_addr: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub gc: GcConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            grpc_addr: default_grpc_addr(),
            log_level: default_log_level(),
            telemetry: TelemetryConfig::default(),
            gc: GcConfig::default(),
        }
    }
}

impl DaemonConfig {
    /// Check addresses, log level and telemetry settings.
    pub fn validate(&self) -> Result<()> {
        for (key, addr) in [("http_addr", &self.http_addr), ("grpc_addr", &self.grpc_addr)] {
            addr.parse::<SocketAddr>().map_err(|e| invalid(key, e))?;
        }

        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(invalid(
                "log_level",
                format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }

        if self.telemetry.enabled {
            let url = &self.telemetry.endpoint_url;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("telemetry.endpoint_url", "must be an http(s) URL"));
            }
            if self.telemetry.push_interval_secs == 0 {
                return Err(invalid("telemetry.push_interval_secs", "must be positive"));
            }
        }

        Ok(())
    }
}

fn invalid(key: &str, reason: impl fmt::Display) -> KindlingError {
    KindlingError::ConfigParseFailed {
        path: format!("daemon.{key}"),
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_endpoint_url", alias = "vector_url")]
    pub endpoint_url: String,
    #[serde(default = "default_push_interval")]
    pub push_interval_secs: u64,
    /// Empty means the daemon uses the host name at runtime
    #[serde(default)]
    pub node_id: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint_url: default_endpoint_url(),
            push_interval_secs: default_push_interval(),
            node_id: String::new(),
        }
    }
}

/// Garbage collection schedule; zero disables it
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcConfig {
    #[serde(default)]
    pub schedule_secs: u64,
}

fn default_http_addr() -> String {
    "127.0.0.1:9100".to_string()
}

fn default_grpc_addr() -> String {
    "127.0.0.1:9101".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_endpoint_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

fn default_push_interval() -> u64 {
    60
}
