//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::net::socket::DEFAULT_SOCKET_PATH;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Admin socket settings.
    pub admin: AdminSocketConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Admin socket configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminSocketConfig {
    /// Path of the HAProxy stats socket (must be `level admin`).
    pub socket_path: String,

    /// Bound on each round trip in seconds. Unset means wait for the peer.
    pub read_timeout_secs: Option<u64>,
}

impl AdminSocketConfig {
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for AdminSocketConfig {
    fn default() -> Self {
        Self {
            socket_path: DEFAULT_SOCKET_PATH.to_string(),
            read_timeout_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format (pretty, json).
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
