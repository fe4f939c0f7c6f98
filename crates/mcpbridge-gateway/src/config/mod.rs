//! Bridge config loader (strict parsing).

pub mod schema;

use std::fs;

use mcpbridge_core::{BridgeError, Result};

pub use schema::{BridgeConfig, BridgeSection, GatewaySection};

pub fn load_from_file(path: &str) -> Result<BridgeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| BridgeError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BridgeConfig> {
    let cfg: BridgeConfig = serde_yaml::from_str(s)
        .map_err(|e| BridgeError::Internal(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
