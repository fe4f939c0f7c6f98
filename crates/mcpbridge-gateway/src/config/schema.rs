use std::time::Duration;

use serde::Deserialize;
use mcpbridge_core::{BridgeError, Result};

fn invalid(msg: &str) -> BridgeError {
    BridgeError::Internal(format!("invalid config: {msg}"))
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub bridge: BridgeSection,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            bridge: BridgeSection::default(),
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(invalid(&format!("unsupported version {}", self.version)));
        }
        self.gateway.validate()?;
        self.bridge.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default = "default_ping_interval_ms")]
    pub ping_interval_ms: u64,

    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            ping_interval_ms: default_ping_interval_ms(),
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if !(5000..=120000).contains(&self.ping_interval_ms) {
            return Err(invalid("gateway.ping_interval_ms must be between 5000 and 120000"));
        }
        if !(10000..=600000).contains(&self.idle_timeout_ms) {
            return Err(invalid("gateway.idle_timeout_ms must be between 10000 and 600000"));
        }
        if self.idle_timeout_ms <= self.ping_interval_ms {
            return Err(invalid("gateway.idle_timeout_ms must be greater than ping_interval_ms"));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "127.0.0.1:8765".into()
}
fn default_ping_interval_ms() -> u64 {
    20000
}
fn default_idle_timeout_ms() -> u64 {
    60000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSection {
    /// How long a forwarded command may wait for the host's answer.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,

    /// Outbound queue depth per socket.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for BridgeSection {
    fn default() -> Self {
        Self {
            request_timeout_ms: default_request_timeout_ms(),
            max_frame_bytes: default_max_frame_bytes(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl BridgeSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=600000).contains(&self.request_timeout_ms) {
            return Err(invalid("bridge.request_timeout_ms must be between 100 and 600000"));
        }
        if !(1024..=64 * 1024 * 1024).contains(&self.max_frame_bytes) {
            return Err(invalid("bridge.max_frame_bytes must be between 1 KiB and 64 MiB"));
        }
        if !(1..=65536).contains(&self.queue_capacity) {
            return Err(invalid("bridge.queue_capacity must be between 1 and 65536"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_request_timeout_ms() -> u64 {
    30000
}
fn default_max_frame_bytes() -> usize {
    16 * 1024 * 1024
}
fn default_queue_capacity() -> usize {
    1024
}
