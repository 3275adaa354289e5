//! # parlor-hub
//!
//! The coordination core of a single chat room.
//!
//! - [`hub`]: the [`Hub`] coordination loop owning the membership set and
//!   fanning every message out to all members
//! - [`session`]: per-client [`ClientSession`] with its inbound and outbound pumps
//! - [`connection`]: the transport boundary a session reads from and writes to
//! - [`memory`]: an in-process [`Connection`] used by tests and embedders
//!
//! ## Data Flow
//!
//! connection → inbound pump → `Forward` → hub fan-out → mailboxes →
//! outbound pumps → connections.

#![deny(unsafe_code)]

pub mod connection;
pub mod errors;
pub mod events;
pub mod hub;
pub mod ids;
pub mod memory;
pub mod message;
pub mod metrics;
pub mod session;

pub use connection::{Connection, ConnectionReader, ConnectionWriter};
pub use errors::{ConnectionError, HubError};
pub use events::{EvictionReason, HubEvent};
pub use hub::{Hub, HubConfig, HubHandle};
pub use ids::SessionId;
pub use message::Message;
pub use session::ClientSession;
