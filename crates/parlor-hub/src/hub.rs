//! The room's coordination loop.
//!
//! [`Hub`] owns the membership set: a map from [`SessionId`] to the sending
//! half of that session's mailbox. Only [`Hub::run`] touches it, one command
//! at a time, so no lock guards it. Everyone else talks to the loop through a
//! cloneable [`HubHandle`].
//!
//! Fan-out never waits on a recipient. A mailbox that cannot take a message
//! right now gets its session evicted, which is the same cleanup as a leave:
//! the sender is dropped from the map, closing the mailbox exactly once.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use metrics::{counter, gauge};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::errors::HubError;
use crate::events::{EvictionReason, HubEvent};
use crate::ids::SessionId;
use crate::message::Message;
use crate::metrics::{
    ROOM_DELIVERIES_TOTAL, ROOM_EVICTIONS_TOTAL, ROOM_JOINS_TOTAL, ROOM_LEAVES_TOTAL,
    ROOM_MEMBERS, ROOM_MESSAGES_TOTAL,
};

/// Default bound on queued hub commands.
pub const DEFAULT_INTAKE_CAPACITY: usize = 1024;
/// Default bound on messages waiting in one session's mailbox.
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// Buffered [`HubEvent`]s per observer before it starts lagging.
const EVENT_CAPACITY: usize = 1024;

/// Hub sizing.
#[derive(Clone, Debug)]
pub struct HubConfig {
    /// Commands that may queue before submitters wait.
    pub intake_capacity: usize,
    /// Messages each session mailbox holds before its owner is evicted.
    pub mailbox_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            intake_capacity: DEFAULT_INTAKE_CAPACITY,
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

/// A request to the coordination loop.
#[derive(Debug)]
pub(crate) enum HubCommand {
    Join {
        session: SessionId,
        mailbox: mpsc::Sender<Message>,
    },
    Leave {
        session: SessionId,
    },
    Forward {
        message: Message,
    },
    Members {
        reply: oneshot::Sender<Vec<SessionId>>,
    },
}

/// The single-room coordination loop.
///
/// Build with [`Hub::new`] and spawn [`run`](Self::run) once.
pub struct Hub {
    members: HashMap<SessionId, mpsc::Sender<Message>>,
    commands: mpsc::Receiver<HubCommand>,
    member_count: Arc<AtomicUsize>,
    events: broadcast::Sender<HubEvent>,
}

impl Hub {
    /// Create a hub and the handle used to reach it.
    pub fn new(config: &HubConfig) -> (Self, HubHandle) {
        let (cmd_tx, cmd_rx) = mpsc::channel(config.intake_capacity.max(1));
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let member_count = Arc::new(AtomicUsize::new(0));

        let handle = HubHandle {
            commands: cmd_tx,
            member_count: Arc::clone(&member_count),
            events: events.clone(),
            mailbox_capacity: config.mailbox_capacity.max(1),
        };

        (
            Self {
                members: HashMap::new(),
                commands: cmd_rx,
                member_count,
                events,
            },
            handle,
        )
    }

    /// Process commands until `cancel` fires or every handle is dropped.
    ///
    /// On exit the membership set is dropped, closing every open mailbox.
    pub async fn run(mut self, cancel: CancellationToken) {
        info!("room hub started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.handle(command),
                    None => break,
                },
                () = cancel.cancelled() => break,
            }
        }

        let remaining = self.members.len();
        self.members.clear();
        self.publish_count();
        info!(remaining, "room hub stopped");
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Join { session, mailbox } => self.join(session, mailbox),
            HubCommand::Leave { session } => self.leave(&session),
            HubCommand::Forward { message } => self.forward(&message),
            HubCommand::Members { reply } => {
                let _ = reply.send(self.members.keys().cloned().collect());
            }
        }
    }

    fn join(&mut self, session: SessionId, mailbox: mpsc::Sender<Message>) {
        if self.members.insert(session.clone(), mailbox).is_some() {
            warn!(%session, "session joined twice, previous mailbox closed");
        }
        counter!(ROOM_JOINS_TOTAL).increment(1);
        self.publish_count();
        self.emit(HubEvent::Joined { session });
    }

    fn leave(&mut self, session: &SessionId) {
        // Removing the sender closes the mailbox; a second leave finds nothing.
        if self.members.remove(session).is_none() {
            debug!(%session, "leave for absent session ignored");
            return;
        }
        counter!(ROOM_LEAVES_TOTAL).increment(1);
        self.publish_count();
        self.emit(HubEvent::Left {
            session: session.clone(),
        });
    }

    fn forward(&mut self, message: &Message) {
        counter!(ROOM_MESSAGES_TOTAL).increment(1);
        trace!(bytes = message.len(), members = self.members.len(), "forwarding");

        let mut delivered = Vec::with_capacity(self.members.len());
        let mut evicted = Vec::new();
        self.members
            .retain(|session, mailbox| match mailbox.try_send(message.clone()) {
                Ok(()) => {
                    delivered.push(session.clone());
                    true
                }
                Err(TrySendError::Full(_)) => {
                    evicted.push((session.clone(), EvictionReason::MailboxFull));
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    evicted.push((session.clone(), EvictionReason::MailboxClosed));
                    false
                }
            });

        counter!(ROOM_DELIVERIES_TOTAL).increment(delivered.len() as u64);
        for session in delivered {
            self.emit(HubEvent::Delivered { session });
        }

        if !evicted.is_empty() {
            self.publish_count();
        }
        for (session, reason) in evicted {
            counter!(ROOM_EVICTIONS_TOTAL, "reason" => reason.as_str()).increment(1);
            self.emit(HubEvent::Evicted { session, reason });
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn publish_count(&self) {
        let count = self.members.len();
        self.member_count.store(count, Ordering::Relaxed);
        gauge!(ROOM_MEMBERS).set(count as f64);
    }

    fn emit(&self, event: HubEvent) {
        {
            let session = event.session();
            let what = event.description();
            let members = self.members.len();
            match &event {
                HubEvent::Joined { .. } | HubEvent::Left { .. } => {
                    info!(%session, members, "{what}");
                }
                HubEvent::Delivered { .. } => trace!(%session, "{what}"),
                HubEvent::Evicted { reason, .. } => {
                    warn!(%session, reason = reason.as_str(), "{what}");
                }
            }
        }
        // Err only means nobody is subscribed.
        if self.events.receiver_count() > 0 {
            let _ = self.events.send(event);
        }
    }
}

/// Cloneable entry point to a running [`Hub`].
///
/// Submissions wait only while the hub's intake is full; they never wait for
/// the command to be processed.
#[derive(Clone, Debug)]
pub struct HubHandle {
    commands: mpsc::Sender<HubCommand>,
    member_count: Arc<AtomicUsize>,
    events: broadcast::Sender<HubEvent>,
    mailbox_capacity: usize,
}

impl HubHandle {
    /// Add a session and the sending half of its mailbox to the room.
    pub async fn join(
        &self,
        session: SessionId,
        mailbox: mpsc::Sender<Message>,
    ) -> Result<(), HubError> {
        self.submit(HubCommand::Join { session, mailbox }).await
    }

    /// Remove a session. Leaving twice is harmless.
    pub async fn leave(&self, session: SessionId) -> Result<(), HubError> {
        self.submit(HubCommand::Leave { session }).await
    }

    /// Broadcast a message to every current member, sender included.
    pub async fn forward(&self, message: impl Into<Message>) -> Result<(), HubError> {
        self.submit(HubCommand::Forward {
            message: message.into(),
        })
        .await
    }

    /// Snapshot of current members, taken in order with other commands.
    pub async fn members(&self) -> Result<Vec<SessionId>, HubError> {
        let (reply, rx) = oneshot::channel();
        self.submit(HubCommand::Members { reply }).await?;
        rx.await.map_err(|_| HubError::Closed)
    }

    /// Member count as of the last processed membership change.
    pub fn member_count(&self) -> usize {
        self.member_count.load(Ordering::Relaxed)
    }

    /// Observe hub transitions from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.events.subscribe()
    }

    /// Capacity for newly allocated session mailboxes.
    pub fn mailbox_capacity(&self) -> usize {
        self.mailbox_capacity
    }

    /// Whether the coordination loop has stopped.
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    /// Queue a leave without waiting. Used from `Drop`, where awaiting is
    /// impossible.
    pub(crate) fn leave_now(&self, session: SessionId) {
        match self.commands.try_send(HubCommand::Leave { session }) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(command)) => {
                let commands = self.commands.clone();
                if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                    drop(runtime.spawn(async move {
                        let _ = commands.send(command).await;
                    }));
                } else {
                    warn!("hub intake full outside a runtime, leave dropped");
                }
            }
        }
    }

    async fn submit(&self, command: HubCommand) -> Result<(), HubError> {
        self.commands.send(command).await.map_err(|_| HubError::Closed)
    }
}
