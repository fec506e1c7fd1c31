//! `[serve]` section configuration.
//!
//! Contains development server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5278                 # WebSocket port for hot updates
//! watch = ["src"]             # Directories to watch (relative to project root)
//! ```
//!
//! Use `interface = "0.0.0.0"` to accept clients from the LAN.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// WebSocket port. When taken, the next ports are tried.
    pub port: u16,

    /// Roots watched for component changes.
    pub watch: Vec<PathBuf>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5278,
            watch: vec![PathBuf::from("src")],
        }
    }
}

impl ServeConfig {
    pub const PORT: FieldPath = FieldPath::new("serve.port");
    pub const WATCH: FieldPath = FieldPath::new("serve.watch");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(Self::PORT, "port 0 is not allowed");
        }
        if self.watch.is_empty() {
            diag.error_with_hint(Self::WATCH, "nothing to watch", "use e.g. [\"src\"]");
        }
    }
}
