//! Transport layer (WebSocket).
//!
//! Upgrade handlers for the controller and host sockets, the shared frame
//! codec and heartbeat.

pub mod codec;
pub mod heartbeat;
pub mod host;
pub mod ws;
