//! Protocol modules.
//!
//! - `envelope`: JSON request/response envelopes exchanged by controllers,
//!   the bridge and the host executor.
//! - `value`: structured editor values <-> JSON.
//! - `command`: the command vocabulary and its parameter contracts.
//!
//! All parsers are panic-free: malformed input is reported as `BridgeError`
//! so the caller can still answer with an error envelope.

pub mod command;
pub mod envelope;
pub mod value;
