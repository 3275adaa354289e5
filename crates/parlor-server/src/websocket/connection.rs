//! [`Connection`] over an axum `WebSocket`.
//!
//! Text and binary frames both carry messages. Control frames are handled by
//! the `WebSocket` layer and never reach the room.

use async_trait::async_trait;
use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parlor_hub::{Connection, ConnectionError, ConnectionReader, ConnectionWriter, Message};

/// An upgraded `WebSocket` ready to be handed to a session.
pub struct WsConnection {
    socket: WebSocket,
}

impl WsConnection {
    /// Wrap an upgraded socket.
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

impl Connection for WsConnection {
    type Reader = WsReader;
    type Writer = WsWriter;

    fn split(self) -> (WsReader, WsWriter) {
        let (sink, stream) = self.socket.split();
        (WsReader { stream }, WsWriter { sink })
    }
}

/// Receiving half of a [`WsConnection`].
pub struct WsReader {
    stream: SplitStream<WebSocket>,
}

#[async_trait]
impl ConnectionReader for WsReader {
    async fn receive(&mut self) -> Result<Message, ConnectionError> {
        loop {
            match self.stream.next().await {
                Some(Ok(WsMessage::Text(text))) => return Ok(Message::from(text.to_string())),
                Some(Ok(WsMessage::Binary(bytes))) => return Ok(Message::from(bytes)),
                // axum answers pings itself
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {}
                Some(Ok(WsMessage::Close(_))) | None => return Err(ConnectionError::Closed),
                Some(Err(e)) => return Err(ConnectionError::Transport(e.to_string())),
            }
        }
    }
}

/// Sending half of a [`WsConnection`].
pub struct WsWriter {
    sink: SplitSink<WebSocket, WsMessage>,
}

#[async_trait]
impl ConnectionWriter for WsWriter {
    async fn send(&mut self, message: Message) -> Result<(), ConnectionError> {
        let frame = match message.as_str() {
            Some(text) => WsMessage::Text(text.to_owned().into()),
            None => WsMessage::Binary(message.into_bytes()),
        };
        self.sink
            .send(frame)
            .await
            .map_err(|e| ConnectionError::Transport(e.to_string()))
    }

    async fn close(&mut self) {
        let _ = self.sink.send(WsMessage::Close(None)).await;
        let _ = self.sink.close().await;
    }
}
