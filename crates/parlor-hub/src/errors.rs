//! Hub and connection error types.

use thiserror::Error;

/// A receive or send on a client connection failed.
///
/// Contained to the one session that hit it: the session's pumps stop and
/// the hub sees nothing more than a `Leave`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// The peer closed the connection or the session was shut down.
    #[error("connection closed")]
    Closed,
    /// The underlying transport failed.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Submitting an event to the hub failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HubError {
    /// The coordination loop has stopped.
    #[error("hub is not running")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_display() {
        assert_eq!(ConnectionError::Closed.to_string(), "connection closed");
    }

    #[test]
    fn transport_display_carries_detail() {
        let err = ConnectionError::Transport("reset by peer".into());
        assert_eq!(err.to_string(), "transport error: reset by peer");
    }

    #[test]
    fn hub_closed_display() {
        assert_eq!(HubError::Closed.to_string(), "hub is not running");
    }
}
