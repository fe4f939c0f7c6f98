//! Frame classification for both socket kinds.
//!
//! - Text frames carry envelopes and are passed through untouched
//! - Binary frames are not part of the protocol and fail with a parse error
//! - Ping/Pong/Close are surfaced for lifecycle management

use axum::extract::ws::Message;
use mcpbridge_core::{BridgeError, Result};

#[derive(Debug)]
pub enum Inbound {
    Text(String),
    Ping(Vec<u8>),
    Pong,
    Close,
}

pub fn decode(msg: Message) -> Result<Inbound> {
    match msg {
        Message::Text(s) => Ok(Inbound::Text(s)),
        Message::Binary(b) => Err(BridgeError::Parse(format!(
            "binary frames are not supported ({} bytes)",
            b.len()
        ))),
        Message::Ping(v) => Ok(Inbound::Ping(v)),
        Message::Pong(_) => Ok(Inbound::Pong),
        Message::Close(_) => Ok(Inbound::Close),
    }
}
