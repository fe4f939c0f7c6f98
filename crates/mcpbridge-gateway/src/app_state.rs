//! Shared application state for the bridge server.

use std::sync::Arc;

use mcpbridge_core::protocol::command::CommandTable;
use mcpbridge_core::Result;

use crate::bridge::{ControllerRegistry, HostSlot, PendingTable};
use crate::config::BridgeConfig;
use crate::dispatch::Dispatcher;
use crate::obs::{BridgeMetrics, Snapshot};

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<BridgeConfig>,
    host: Arc<HostSlot>,
    controllers: Arc<ControllerRegistry>,
    pending: Arc<PendingTable>,
    metrics: Arc<BridgeMetrics>,
    dispatcher: Arc<Dispatcher>,
}

impl AppState {
    /// Build state with the built-in command table.
    pub fn new(cfg: BridgeConfig) -> Result<Self> {
        Self::with_table(cfg, CommandTable::builtin())
    }

    pub fn with_table(cfg: BridgeConfig, table: CommandTable) -> Result<Self> {
        cfg.validate()?;

        let host = Arc::new(HostSlot::new());
        let controllers = Arc::new(ControllerRegistry::new());
        let pending = Arc::new(PendingTable::new());
        let metrics = Arc::new(BridgeMetrics::default());

        let dispatcher = Dispatcher::new(
            table,
            Arc::clone(&host),
            Arc::clone(&pending),
            Arc::clone(&controllers),
            Arc::clone(&metrics),
            cfg.bridge.request_timeout(),
        );
        tracing::debug!(commands = ?dispatcher.table().names(), "dispatch table ready");

        Ok(Self {
            cfg: Arc::new(cfg),
            host,
            controllers,
            pending,
            metrics,
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn cfg(&self) -> &BridgeConfig {
        &self.cfg
    }

    pub fn host(&self) -> Arc<HostSlot> {
        Arc::clone(&self.host)
    }

    pub fn controllers(&self) -> Arc<ControllerRegistry> {
        Arc::clone(&self.controllers)
    }

    pub fn pending(&self) -> Arc<PendingTable> {
        Arc::clone(&self.pending)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn metrics(&self) -> Arc<BridgeMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Ready once a host executor is connected.
    pub fn is_ready(&self) -> bool {
        self.host.is_open()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            controllers: self.controllers.len(),
            pending_requests: self.pending.len(),
            host_connected: self.host.is_open(),
        }
    }
}
