//! Client configuration.
//!
//! ```toml
//! host = "192.168.0.30"
//! port = 1314
//! connect_timeout_ms = 3000
//! write_timeout_ms = 3000
//!
//! [delimiters]
//! start = ">"
//! stop = "<"
//! ```
//!
//! Every key is optional; missing keys take the [`Default`] values.

use homealarm_core::{
    Delimiters,
    constants::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_WRITE_TIMEOUT_MS},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the simulator client
///
/// # Example
///
/// ```
/// use homealarm_network::ClientConfig;
///
/// let config = ClientConfig {
///     host: "127.0.0.1".to_string(),
///     port: 4000,
///     ..Default::default()
/// };
/// assert_eq!(config.addr(), "127.0.0.1:4000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Simulator host name or IP address
    pub host: String,

    /// Simulator TCP port
    pub port: u16,

    /// Timeout for establishing the connection
    pub connect_timeout_ms: u64,

    /// Timeout for a single outbound command
    pub write_timeout_ms: u64,

    /// Delimiters framing every message in both directions
    pub delimiters: Delimiters,
}

impl ClientConfig {
    /// Address passed to the resolver, `host:port`.
    ///
    /// IPv6 literals are bracketed.
    pub fn addr(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            delimiters: Delimiters::default(),
        }
    }
}
