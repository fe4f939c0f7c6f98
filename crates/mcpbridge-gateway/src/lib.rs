//! Editor command bridge server.
//!
//! Accepts controller connections and a single host executor connection,
//! validates controller requests against the command table, forwards them to
//! the host under bridge-assigned ids and relays the answers back to whoever
//! asked. Consumed by the binary (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod router;
pub mod transport;

use std::future::Future;

use tokio::net::TcpListener;

use mcpbridge_core::{BridgeError, Result};

/// Serve the bridge on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: app_state::AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router::build_router(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| BridgeError::Internal(format!("server failed: {e}")))
}
