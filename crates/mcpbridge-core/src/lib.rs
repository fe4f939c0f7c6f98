//! mcpbridge core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire-level contracts shared by the bridge server and
//! the host-resident executor: the request/response envelope, the structured
//! value codec, and the command dispatch table. It carries no transport or
//! runtime dependencies so both sides of the bridge can link it.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Malformed input surfaces as `BridgeError` and is answered with an error
//! envelope instead of taking the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{BridgeError, ErrorCode, ResourceKind, Result};
