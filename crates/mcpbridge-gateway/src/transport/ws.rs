//! Controller WebSocket sessions.
//!
//! Each controller gets an outbound queue registered under its id. Inbound
//! text frames go to the dispatcher; an immediate reply (validation failure,
//! host unavailable) is written straight back, while relayed host answers and
//! timeouts arrive through the queue.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::Instrument;

use mcpbridge_core::protocol::envelope::Response as Envelope;

use crate::app_state::AppState;
use crate::transport::codec::{decode, Inbound};
use crate::transport::heartbeat::{Heartbeat, IDLE_CHECK};

pub async fn controller_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let max = app.cfg().bridge.max_frame_bytes;
    ws.max_message_size(max)
        .max_frame_size(max)
        .on_upgrade(move |socket| run_session(app, socket))
}

async fn run_session(app: AppState, socket: WebSocket) {
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(app.cfg().bridge.queue_capacity);
    let controllers = app.controllers();
    let dispatcher = app.dispatcher();
    let id = controllers.register(out_tx);

    let span = tracing::info_span!("controller", controller = %id);
    async {
        tracing::info!(connected = controllers.len(), "controller connected");

        let (mut ws_tx, mut ws_rx) = socket.split();
        let mut hb = Heartbeat::new(&app.cfg().gateway);

        loop {
            tokio::select! {
                maybe_out = out_rx.recv() => {
                    let Some(m) = maybe_out else { break; };
                    if ws_tx.send(m).await.is_err() {
                        break;
                    }
                }

                incoming = ws_rx.next() => {
                    let Some(Ok(msg)) = incoming else { break; };
                    hb.touch();

                    let reply = match decode(msg) {
                        Ok(Inbound::Text(s)) => dispatcher.handle_controller_text(id, &s),
                        Ok(Inbound::Ping(p)) => {
                            if ws_tx.send(Message::Pong(p)).await.is_err() {
                                break;
                            }
                            None
                        }
                        Ok(Inbound::Pong) => None,
                        Ok(Inbound::Close) => break,
                        Err(e) => Some(Envelope::from_error(None, &e)),
                    };

                    if let Some(reply) = reply {
                        if ws_tx.send(Message::Text(reply.to_text())).await.is_err() {
                            break;
                        }
                    }
                }

                _ = hb.ping_due() => {
                    if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }

                _ = tokio::time::sleep(IDLE_CHECK) => {
                    if hb.idle_expired() {
                        tracing::info!("controller idle timeout");
                        break;
                    }
                }
            }
        }

        controllers.remove(id);
        dispatcher.controller_disconnected(id);
        tracing::info!(connected = controllers.len(), "controller disconnected");
    }
    .instrument(span)
    .await
}
