//! Per-client session: one connection, one mailbox, two pumps.
//!
//! The inbound pump reads from the connection and forwards every message to
//! the hub. The outbound pump drains the session's mailbox into the
//! connection. A per-session [`CancellationToken`] stands in for "close the
//! connection": whichever pump stops first cancels it and the other follows.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info_span};

use crate::connection::{Connection, ConnectionReader, ConnectionWriter};
use crate::errors::{ConnectionError, HubError};
use crate::hub::HubHandle;
use crate::ids::SessionId;
use crate::message::Message;

/// How long the outbound pump waits on a closing handshake before dropping
/// the connection.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(1);

/// A connected client that has joined the room.
pub struct ClientSession<C: Connection> {
    id: SessionId,
    hub: HubHandle,
    connection: C,
    mailbox: mpsc::Receiver<Message>,
    membership: LeaveGuard,
}

impl<C: Connection> ClientSession<C> {
    /// Allocate a fresh mailbox and join the room.
    ///
    /// The session is a member once this returns; neither pump has started.
    pub async fn open(hub: HubHandle, connection: C) -> Result<Self, HubError> {
        let id = SessionId::new();
        let (tx, rx) = mpsc::channel(hub.mailbox_capacity());
        hub.join(id.clone(), tx).await?;

        Ok(Self {
            membership: LeaveGuard::new(id.clone(), hub.clone()),
            id,
            hub,
            connection,
            mailbox: rx,
        })
    }

    /// This session's id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Run until the client goes away, then leave the room.
    ///
    /// The outbound pump is spawned; the inbound pump runs on the caller's
    /// task. The leave is issued when the inbound pump stops, including when
    /// this future is dropped early.
    pub async fn run(self) {
        let Self {
            id,
            hub,
            connection,
            mailbox,
            mut membership,
        } = self;
        let span = info_span!("session", %id);
        let closed = CancellationToken::new();
        let (reader, writer) = connection.split();

        drop(tokio::spawn(
            write_pump(writer, mailbox, closed.clone()).instrument(span.clone()),
        ));

        async {
            let end = read_pump(reader, &hub, &closed).await;
            debug!(reason = end.as_str(), "inbound pump stopped");
            membership.leave().await;
        }
        .instrument(span)
        .await;
    }
}

/// Why the inbound pump stopped.
enum InboundEnd {
    Connection(ConnectionError),
    HubClosed,
    Cancelled,
}

impl InboundEnd {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Connection(ConnectionError::Closed) => "connection closed",
            Self::Connection(ConnectionError::Transport(_)) => "transport error",
            Self::HubClosed => "hub stopped",
            Self::Cancelled => "outbound pump stopped",
        }
    }
}

async fn read_pump<R: ConnectionReader>(
    mut reader: R,
    hub: &HubHandle,
    closed: &CancellationToken,
) -> InboundEnd {
    let end = loop {
        let received = tokio::select! {
            received = reader.receive() => received,
            () = closed.cancelled() => break InboundEnd::Cancelled,
        };
        match received {
            Ok(message) => {
                if hub.forward(message).await.is_err() {
                    break InboundEnd::HubClosed;
                }
            }
            Err(err) => {
                if let ConnectionError::Transport(detail) = &err {
                    debug!(error = %detail, "receive failed");
                }
                break InboundEnd::Connection(err);
            }
        }
    };
    closed.cancel();
    end
}

async fn write_pump<W: ConnectionWriter>(
    mut writer: W,
    mut mailbox: mpsc::Receiver<Message>,
    closed: CancellationToken,
) {
    loop {
        let next = tokio::select! {
            next = mailbox.recv() => next,
            () = closed.cancelled() => break,
        };
        // None: the hub removed us and everything queued has been written.
        let Some(message) = next else {
            debug!("mailbox closed");
            break;
        };
        let sent = tokio::select! {
            sent = writer.send(message) => sent,
            () = closed.cancelled() => break,
        };
        if let Err(err) = sent {
            debug!(error = %err, "send failed");
            break;
        }
    }
    closed.cancel();
    if tokio::time::timeout(CLOSE_TIMEOUT, writer.close()).await.is_err() {
        debug!("close timed out, dropping connection");
    }
}

/// Issues exactly one `Leave` for a joined session.
struct LeaveGuard {
    session: SessionId,
    hub: HubHandle,
    sent: bool,
}

impl LeaveGuard {
    fn new(session: SessionId, hub: HubHandle) -> Self {
        Self {
            session,
            hub,
            sent: false,
        }
    }

    async fn leave(&mut self) {
        if self.sent {
            return;
        }
        if self.hub.leave(self.session.clone()).await.is_err() {
            debug!("hub already stopped");
        }
        self.sent = true;
    }
}

impl Drop for LeaveGuard {
    fn drop(&mut self) {
        if !self.sent {
            self.hub.leave_now(self.session.clone());
        }
    }
}
