//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]`, so a settings
//! file may name any subset of fields; the rest keep their defaults.

mod http;
mod logging;
mod server;

pub use http::*;
pub use logging::*;
pub use server::*;

use serde::{Deserialize, Serialize};

/// Root settings type for the parlor server.
///
/// # JSON Format
///
/// ```json
/// {
///   "server": { "port": 9090, "maxConnections": 200 },
///   "room": { "mailboxCapacity": 64 },
///   "logging": { "level": "debug" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParlorSettings {
    /// Listener and connection limits.
    pub server: ServerSettings,
    /// Hub queue sizes.
    pub room: RoomSettings,
    /// Static assets.
    pub http: HttpSettings,
    /// Log output.
    pub logging: LoggingSettings,
}
