//! WebSocket client that attaches an executor to the bridge's host endpoint.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use mcpbridge_core::{BridgeError, Result};

use crate::executor::Executor;

/// Attach to `url` and serve requests until the bridge closes the socket.
///
/// Requests are answered one at a time, in arrival order.
pub async fn run(url: &str, executor: Arc<Executor>) -> Result<()> {
    let (ws, _resp) = connect_async(url)
        .await
        .map_err(|e| BridgeError::Internal(format!("connect to {url} failed: {e}")))?;
    tracing::info!(%url, "executor attached to bridge");

    let (mut ws_tx, mut ws_rx) = ws.split();

    while let Some(incoming) = ws_rx.next().await {
        let msg = incoming.map_err(|e| BridgeError::Internal(format!("websocket read failed: {e}")))?;
        match msg {
            Message::Text(raw) => {
                let reply = executor.handle_text(&raw);
                ws_tx
                    .send(Message::Text(reply))
                    .await
                    .map_err(|e| BridgeError::Internal(format!("websocket write failed: {e}")))?;
            }
            Message::Close(_) => break,
            // tungstenite answers pings itself.
            _ => {}
        }
    }

    tracing::info!(%url, "bridge connection closed");
    Ok(())
}
