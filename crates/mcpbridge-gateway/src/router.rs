//! Axum router wiring (HTTP -> WS upgrade, ops endpoints).
//!
//! Controllers connect on `/` or `/v1/ws`, the host executor on `/v1/host`.

use axum::{routing::get, Router};

use crate::{app_state::AppState, ops, transport};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(transport::ws::controller_upgrade))
        .route("/v1/ws", get(transport::ws::controller_upgrade))
        .route("/v1/host", get(transport::host::host_upgrade))
        .route("/healthz", get(ops::healthz))
        .route("/readyz", get(ops::readyz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}
