//! Host-resident side of the bridge.
//!
//! The executor receives request envelopes from the bridge, runs them against
//! an `EditorHost` and answers with exactly one response envelope per request.
//! `SceneHost` is an in-memory editor used by the binary and by tests; a real
//! editor integration implements `EditorHost` instead.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod client;
pub mod executor;
pub mod host;
pub mod scene;
pub mod scene_host;

pub use executor::Executor;
pub use host::{EditorHost, ProjectInfo};
pub use scene::{NodeInfo, SceneTree};
pub use scene_host::{SceneHost, ToolMethod};
