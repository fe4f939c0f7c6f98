use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;

use mcpbridge_core::protocol::command::CommandTable;
use mcpbridge_core::protocol::envelope::{parse_request, parse_response, Request, Response};
use mcpbridge_core::BridgeError;

use crate::bridge::{ControllerId, ControllerRegistry, Delivery, HostSlot, PendingTable};
use crate::obs::BridgeMetrics;

/// Routes controller requests to the host and host responses back.
///
/// Every accepted controller request ends in exactly one response to that
/// controller: an immediate error, the host's relayed answer, a timeout, or
/// `ConnectionUnavailable` when the host goes away first. The only exception
/// is a controller that disconnected, whose outstanding requests are dropped.
pub struct Dispatcher {
    table: CommandTable,
    host: Arc<HostSlot>,
    pending: Arc<PendingTable>,
    controllers: Arc<ControllerRegistry>,
    metrics: Arc<BridgeMetrics>,
    request_timeout: Duration,
}

fn code_label(err: &BridgeError) -> String {
    err.code().as_str().to_ascii_lowercase()
}

impl Dispatcher {
    pub fn new(
        table: CommandTable,
        host: Arc<HostSlot>,
        pending: Arc<PendingTable>,
        controllers: Arc<ControllerRegistry>,
        metrics: Arc<BridgeMetrics>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            table,
            host,
            pending,
            controllers,
            metrics,
            request_timeout,
        }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Handle one controller text frame.
    ///
    /// Returns the reply to send right away, or `None` when the request was
    /// forwarded and its answer will arrive through the controller's queue.
    pub fn handle_controller_text(&self, controller: ControllerId, raw: &str) -> Option<Response> {
        let req = match parse_request(raw) {
            Ok(req) => req,
            Err(rejected) => {
                tracing::debug!(%controller, error = %rejected.error, "request rejected");
                self.metrics
                    .commands
                    .inc(&[("command", "invalid"), ("outcome", &code_label(&rejected.error))]);
                return Some(rejected.into_response());
            }
        };

        let name = match self.table.validate(&req) {
            Ok(spec) => spec.name,
            Err(e) => {
                tracing::debug!(%controller, id = ?req.id, command = %req.command, error = %e, "request rejected");
                let label = if self.table.lookup(&req.command).is_ok() {
                    req.command.as_str()
                } else {
                    "unknown"
                };
                self.metrics
                    .commands
                    .inc(&[("command", label), ("outcome", &code_label(&e))]);
                return Some(Response::from_error(req.id.clone(), &e));
            }
        };

        self.forward(controller, name, req)
    }

    fn forward(&self, controller: ControllerId, name: &str, req: Request) -> Option<Response> {
        // Registered before delivery so a fast host reply always finds its entry.
        let wire_id = self
            .pending
            .insert(controller, req.id.clone(), req.command.clone());
        let frame = Message::Text(req.with_id(wire_id.clone()).to_text());

        // Bound under the slot lock, so a host disconnect that follows
        // always sees this entry in its generation.
        let delivery = self
            .host
            .deliver_then(frame, |generation| self.pending.bind_generation(&wire_id, generation));
        match delivery {
            Delivery::Accepted { generation } => {
                self.metrics
                    .commands
                    .inc(&[("command", name), ("outcome", "forwarded")]);
                tracing::debug!(%controller, id = ?req.id, %wire_id, command = name, generation, "forwarded");
                self.arm_timeout(wire_id);
                None
            }
            Delivery::Rejected(reason) => {
                self.pending.complete(&wire_id);
                let err = BridgeError::ConnectionUnavailable;
                self.metrics
                    .commands
                    .inc(&[("command", name), ("outcome", &code_label(&err))]);
                tracing::debug!(%controller, id = ?req.id, command = name, ?reason, "host unavailable");
                Some(Response::from_error(req.id, &err))
            }
        }
    }

    fn arm_timeout(&self, wire_id: String) {
        let pending = Arc::clone(&self.pending);
        let controllers = Arc::clone(&self.controllers);
        let metrics = Arc::clone(&self.metrics);
        let after = self.request_timeout;

        let key = wire_id.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let Some(entry) = pending.expire(&wire_id) else {
                return;
            };
            let err = BridgeError::Timeout(entry.request_id.clone().unwrap_or_default());
            tracing::warn!(controller = %entry.controller, id = ?entry.request_id, %wire_id, command = %entry.command, "request timed out");
            metrics
                .commands
                .inc(&[("command", &entry.command), ("outcome", &code_label(&err))]);

            let resp = Response::from_error(entry.request_id, &err);
            controllers.send(entry.controller, Message::Text(resp.to_text()));
        });
        self.pending.arm(&key, timer.abort_handle());
    }

    /// Handle one text frame from the host: relay it to the controller that
    /// asked, under that controller's own id.
    pub fn handle_host_text(&self, raw: &str) {
        let resp = match parse_response(raw) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "malformed host response dropped");
                self.metrics.host_responses.inc(&[("result", "malformed")]);
                return;
            }
        };

        let Some(entry) = resp.id.as_deref().and_then(|w| self.pending.complete(w)) else {
            tracing::warn!(id = ?resp.id, "unmatched host response dropped");
            self.metrics.host_responses.inc(&[("result", "unmatched")]);
            return;
        };

        let result = if resp.is_success() { "success" } else { "error" };
        self.metrics.host_responses.inc(&[("result", result)]);
        self.metrics
            .command_latency
            .observe(&[("command", &entry.command)], entry.started.elapsed());

        let out = resp.relay(entry.request_id);
        if !self.controllers.send(entry.controller, Message::Text(out.to_text())) {
            tracing::debug!(controller = %entry.controller, "controller gone, response dropped");
        }
    }

    /// Fail every request still waiting on a host connection that went away.
    pub fn host_disconnected(&self, generation: u64) -> usize {
        let orphaned = self.pending.take_generation(generation);
        let n = orphaned.len();
        for entry in orphaned {
            let err = BridgeError::ConnectionUnavailable;
            self.metrics
                .commands
                .inc(&[("command", &entry.command), ("outcome", &code_label(&err))]);
            let resp = Response::from_error(entry.request_id, &err);
            self.controllers
                .send(entry.controller, Message::Text(resp.to_text()));
        }
        if n > 0 {
            tracing::info!(generation, failed = n, "host lost with requests in flight");
        }
        n
    }

    /// Discard a departed controller's outstanding requests.
    pub fn controller_disconnected(&self, controller: ControllerId) -> usize {
        let n = self.pending.drop_controller(controller);
        if n > 0 {
            tracing::debug!(%controller, dropped = n, "controller left with requests in flight");
        }
        n
    }
}
