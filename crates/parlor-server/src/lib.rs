//! # parlor-server
//!
//! HTTP and `WebSocket` front end for a single chat room.
//!
//! - `GET /room` upgrades to a `WebSocket` and joins the room
//! - `GET /chat` and `GET /login` render the chat and sign-in pages
//! - `GET /assets/*` serves static files
//! - `GET /health` and `GET /metrics` report on the process

#![deny(unsafe_code)]

pub mod errors;
pub mod health;
pub mod identity;
pub mod metrics;
pub mod pages;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use errors::{AcceptError, ServerError};
pub use server::{AppState, ConnectionLimits, ServerHandle, build_router, start};
pub use shutdown::ShutdownCoordinator;
