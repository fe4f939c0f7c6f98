//! Top-level facade crate for the editor command bridge.
//!
//! Re-exports the protocol types, the bridge server and the host-side
//! executor so users can depend on a single crate.

pub mod core {
    pub use mcpbridge_core::*;
}

pub mod gateway {
    pub use mcpbridge_gateway::*;
}

pub mod executor {
    pub use mcpbridge_executor::*;
}
