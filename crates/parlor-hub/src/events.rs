//! Observable room activity.

use crate::ids::SessionId;

/// Why the hub dropped a member during fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// The member's mailbox was at capacity (slow reader).
    MailboxFull,
    /// The member's outbound pump had already gone away.
    MailboxClosed,
}

impl EvictionReason {
    /// Short label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MailboxFull => "mailbox_full",
            Self::MailboxClosed => "mailbox_closed",
        }
    }
}

/// One membership or delivery transition inside the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubEvent {
    /// A session entered the membership set.
    Joined {
        /// The new member.
        session: SessionId,
    },
    /// A session left and its mailbox was closed.
    Left {
        /// The departed member.
        session: SessionId,
    },
    /// A message was queued on a member's mailbox.
    Delivered {
        /// The recipient.
        session: SessionId,
    },
    /// A member was removed because a message could not be queued.
    Evicted {
        /// The evicted member.
        session: SessionId,
        /// What went wrong.
        reason: EvictionReason,
    },
}

impl HubEvent {
    /// The session this event concerns.
    pub fn session(&self) -> &SessionId {
        match self {
            Self::Joined { session }
            | Self::Left { session }
            | Self::Delivered { session }
            | Self::Evicted { session, .. } => session,
        }
    }

    /// Human-readable trace line.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Joined { .. } => "New client joined",
            Self::Left { .. } => "Client left",
            Self::Delivered { .. } => "sent to client",
            Self::Evicted { .. } => "failed to send, cleaned up client",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn four_distinct_descriptions() {
        let s = SessionId::from_raw("s");
        let events = [
            HubEvent::Joined { session: s.clone() },
            HubEvent::Left { session: s.clone() },
            HubEvent::Delivered { session: s.clone() },
            HubEvent::Evicted {
                session: s,
                reason: EvictionReason::MailboxFull,
            },
        ];
        let seen: HashSet<&str> = events.iter().map(HubEvent::description).collect();
        assert_eq!(seen.len(), 4);
    }

    #[test]
    fn session_accessor() {
        let event = HubEvent::Evicted {
            session: SessionId::from_raw("bob"),
            reason: EvictionReason::MailboxClosed,
        };
        assert_eq!(event.session().as_str(), "bob");
    }

    #[test]
    fn reason_labels() {
        assert_eq!(EvictionReason::MailboxFull.as_str(), "mailbox_full");
        assert_eq!(EvictionReason::MailboxClosed.as_str(), "mailbox_closed");
    }
}
