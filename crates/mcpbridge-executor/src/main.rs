//! Executor binary: serves an in-memory editor over the bridge's host socket.

use std::sync::Arc;

use clap::Parser;
use tokio::time::{sleep, Duration};
use tracing_subscriber::{fmt, EnvFilter};

use mcpbridge_executor::{client, executor::DEFAULT_MAX_TREE_DEPTH, Executor, SceneHost};

#[derive(Debug, Parser)]
#[command(name = "mcpbridge-executor", about = "Host-side executor for the editor command bridge")]
struct Args {
    /// Bridge host endpoint.
    #[arg(long, default_value = "ws://127.0.0.1:8765/v1/host")]
    url: String,

    /// Depth bound for scene tree walks.
    #[arg(long, default_value_t = DEFAULT_MAX_TREE_DEPTH)]
    max_tree_depth: usize,

    /// Delay before reattaching after a disconnect; 0 exits instead.
    #[arg(long, default_value_t = 2000)]
    reconnect_ms: u64,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt().with_env_filter(filter).init();

    let executor = Arc::new(
        Executor::new(Arc::new(SceneHost::demo())).with_max_tree_depth(args.max_tree_depth),
    );

    loop {
        if let Err(e) = client::run(&args.url, Arc::clone(&executor)).await {
            tracing::warn!(error = %e, "executor session ended");
        }
        if args.reconnect_ms == 0 {
            break;
        }
        sleep(Duration::from_millis(args.reconnect_ms)).await;
    }
}
