//! Bridge server binary.
//!
//! - Controller endpoint: `/` and `/v1/ws`
//! - Host executor endpoint: `/v1/host`
//! - Ops: `/healthz`, `/readyz`, `/metrics`

use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use mcpbridge_core::{BridgeError, Result};
use mcpbridge_gateway::{app_state::AppState, config};

#[derive(Debug, Parser)]
#[command(name = "mcpbridge-gateway", about = "Editor command bridge server")]
struct Args {
    /// YAML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<String>,

    /// Overrides `gateway.listen`.
    #[arg(long)]
    listen: Option<String>,

    /// Used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).init();

    let mut cfg = match &args.config {
        Some(path) => config::load_from_file(path)?,
        None => config::BridgeConfig::default(),
    };
    if let Some(listen) = args.listen {
        cfg.gateway.listen = listen;
    }

    let listen: SocketAddr = cfg.gateway.listen.parse().map_err(|e| {
        BridgeError::Internal(format!("gateway.listen must be a valid SocketAddr: {e}"))
    })?;

    let state = AppState::new(cfg)?;
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| BridgeError::Internal(format!("bind {listen} failed: {e}")))?;

    tracing::info!(%listen, "mcpbridge-gateway starting");
    mcpbridge_gateway::serve(listener, state, shutdown_signal()).await?;
    tracing::info!("mcpbridge-gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("signal received, starting graceful shutdown");
}
