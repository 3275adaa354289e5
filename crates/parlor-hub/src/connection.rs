//! Transport boundary between a client session and the wire.
//!
//! A [`Connection`] is split once into a reader half and a writer half so the
//! inbound and outbound pumps can run concurrently. The hub never sees either
//! half; it only routes [`Message`]s.

use async_trait::async_trait;

use crate::errors::ConnectionError;
use crate::message::Message;

/// The receiving half of a client connection.
#[async_trait]
pub trait ConnectionReader: Send + 'static {
    /// Wait for the next message from the client.
    ///
    /// An orderly close is reported as [`ConnectionError::Closed`].
    async fn receive(&mut self) -> Result<Message, ConnectionError>;
}

/// The sending half of a client connection.
#[async_trait]
pub trait ConnectionWriter: Send + 'static {
    /// Write one message to the client.
    async fn send(&mut self, message: Message) -> Result<(), ConnectionError>;

    /// Close the connection. Errors while closing are ignored.
    async fn close(&mut self);
}

/// A bidirectional client connection, already admitted and upgraded.
pub trait Connection: Send + 'static {
    /// Receiving half.
    type Reader: ConnectionReader;
    /// Sending half.
    type Writer: ConnectionWriter;

    /// Split into independently owned halves.
    fn split(self) -> (Self::Reader, Self::Writer);
}
