//! Listener, connection-limit, and room settings.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};
use crate::loader::parse_u16_range;

/// Network listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port. `0` picks an ephemeral port.
    pub port: u16,
    /// Connections admitted to the room at once; further upgrades get 503.
    pub max_connections: usize,
    /// Largest inbound `WebSocket` message, in bytes.
    pub max_message_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_connections: 1024,
            max_message_size: 64 * 1024,
        }
    }
}

impl ServerSettings {
    /// Override host and port from a `host:port` or `:port` address.
    ///
    /// An empty host binds every interface. IPv6 hosts must be bracketed.
    pub fn apply_listen_addr(&mut self, addr: &str) -> Result<()> {
        let (host, port) = addr.rsplit_once(':').ok_or_else(|| {
            SettingsError::InvalidValue(format!("listen address '{addr}' has no port"))
        })?;
        let port = parse_u16_range(port, 0, u16::MAX).ok_or_else(|| {
            SettingsError::InvalidValue(format!("listen address '{addr}' has a bad port"))
        })?;
        let host = match host.strip_prefix('[') {
            Some(inner) => inner.strip_suffix(']'),
            None if host.contains([':', ']']) => None,
            None => Some(host),
        }
        .ok_or_else(|| {
            SettingsError::InvalidValue(format!("listen address '{addr}' has a malformed host"))
        })?;

        self.host = if host.is_empty() {
            "0.0.0.0".to_string()
        } else {
            host.to_string()
        };
        self.port = port;
        Ok(())
    }

    /// `host:port` suitable for a TCP bind.
    pub fn listen_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Hub queue sizes.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoomSettings {
    /// Commands (join, leave, forward) buffered ahead of the hub loop.
    pub intake_capacity: usize,
    /// Messages buffered per client before it is evicted as too slow.
    pub mailbox_capacity: usize,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            intake_capacity: 1024,
            mailbox_capacity: 256,
        }
    }
}
