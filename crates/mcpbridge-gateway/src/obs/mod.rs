//! Lightweight in-process metrics.
//!
//! Stored as atomics and rendered by the `/metrics` handler in Prometheus text
//! format.

pub mod metrics;

pub use metrics::{BridgeMetrics, Snapshot};
