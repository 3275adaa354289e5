//! `WebSocket` transport for the room.

pub mod acceptor;
pub mod connection;

pub use acceptor::room_handler;
pub use connection::WsConnection;
