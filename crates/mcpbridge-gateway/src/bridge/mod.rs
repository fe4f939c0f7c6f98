//! Bridge runtime state.
//!
//! The host slot (single live executor connection), the controller registry
//! and the pending-request table shared by the dispatcher and the socket
//! sessions.

mod controllers;
mod host_slot;
mod pending;

pub use controllers::{ControllerId, ControllerRegistry};
pub use host_slot::{Delivery, HostLease, HostSlot, HostState, RejectReason};
pub use pending::{PendingEntry, PendingTable};
