//! In-process connections backed by channels.
//!
//! [`pair`] returns the server side ([`MemoryConnection`], handed to a
//! [`ClientSession`](crate::ClientSession)) and the client side
//! ([`MemoryPeer`], driven by the caller).

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::connection::{Connection, ConnectionReader, ConnectionWriter};
use crate::errors::ConnectionError;
use crate::message::Message;

/// Create a connected server/client pair.
///
/// `buffer` bounds each direction. A peer that stops reading eventually
/// blocks the server's writer, which is how tests simulate a slow client.
pub fn pair(buffer: usize) -> (MemoryConnection, MemoryPeer) {
    let (to_server, from_peer) = mpsc::channel(buffer);
    let (to_peer, from_server) = mpsc::channel(buffer);
    (
        MemoryConnection {
            inbound: from_peer,
            outbound: to_peer,
        },
        MemoryPeer {
            tx: Some(to_server),
            rx: from_server,
        },
    )
}

/// Server side of an in-memory connection.
pub struct MemoryConnection {
    inbound: mpsc::Receiver<Message>,
    outbound: mpsc::Sender<Message>,
}

impl Connection for MemoryConnection {
    type Reader = MemoryReader;
    type Writer = MemoryWriter;

    fn split(self) -> (MemoryReader, MemoryWriter) {
        (
            MemoryReader {
                inbound: self.inbound,
            },
            MemoryWriter {
                outbound: Some(self.outbound),
            },
        )
    }
}

/// Receiving half of a [`MemoryConnection`].
pub struct MemoryReader {
    inbound: mpsc::Receiver<Message>,
}

#[async_trait]
impl ConnectionReader for MemoryReader {
    async fn receive(&mut self) -> Result<Message, ConnectionError> {
        self.inbound.recv().await.ok_or(ConnectionError::Closed)
    }
}

/// Sending half of a [`MemoryConnection`].
pub struct MemoryWriter {
    outbound: Option<mpsc::Sender<Message>>,
}

#[async_trait]
impl ConnectionWriter for MemoryWriter {
    async fn send(&mut self, message: Message) -> Result<(), ConnectionError> {
        match &self.outbound {
            Some(tx) => tx.send(message).await.map_err(|_| ConnectionError::Closed),
            None => Err(ConnectionError::Closed),
        }
    }

    async fn close(&mut self) {
        self.outbound = None;
    }
}

/// Client side of an in-memory connection.
pub struct MemoryPeer {
    tx: Option<mpsc::Sender<Message>>,
    rx: mpsc::Receiver<Message>,
}

impl MemoryPeer {
    /// Send a message to the server side.
    pub async fn send(&self, message: impl Into<Message>) -> Result<(), ConnectionError> {
        match &self.tx {
            Some(tx) => tx
                .send(message.into())
                .await
                .map_err(|_| ConnectionError::Closed),
            None => Err(ConnectionError::Closed),
        }
    }

    /// Wait for the next message from the server side.
    ///
    /// Returns `None` once the server has closed its writer and every
    /// buffered message has been read.
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }

    /// Close the client's sending direction; the server's next receive fails.
    pub fn close(&mut self) {
        self.tx = None;
    }
}
