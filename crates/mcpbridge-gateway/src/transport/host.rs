//! Host executor WebSocket session.
//!
//! The host connects in, claims the host slot and then receives forwarded
//! requests through its outbound queue. A second host connecting supersedes
//! this one: the slot drops our queue sender, `out_rx` ends and the loop
//! exits. Whatever was still waiting on this connection fails with
//! `ConnectionUnavailable` before the slot is released.

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::app_state::AppState;
use crate::transport::codec::{decode, Inbound};
use crate::transport::heartbeat::{Heartbeat, IDLE_CHECK};

pub async fn host_upgrade(State(app): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let max = app.cfg().bridge.max_frame_bytes;
    ws.max_message_size(max)
        .max_frame_size(max)
        .on_upgrade(move |socket| run_session(app, socket))
}

async fn run_session(app: AppState, socket: WebSocket) {
    let slot = app.host();
    let dispatcher = app.dispatcher();

    let (lease, superseded) = slot.begin_connect();
    let span = tracing::info_span!("host", generation = lease.generation());

    async {
        if let Some(old) = superseded {
            tracing::warn!(superseded = old, "new host connection replaces the current one");
        }

        let (out_tx, mut out_rx) = mpsc::channel::<Message>(app.cfg().bridge.queue_capacity);
        if !slot.open(lease, out_tx) {
            tracing::info!("host connection superseded before it opened");
            return;
        }
        tracing::info!("host executor connected");

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

                    match decode(msg) {
                        Ok(Inbound::Text(s)) => dispatcher.handle_host_text(&s),
                        Ok(Inbound::Ping(p)) => {
                            if ws_tx.send(Message::Pong(p)).await.is_err() {
                                break;
                            }
                        }
                        Ok(Inbound::Pong) => {}
                        Ok(Inbound::Close) => break,
                        Err(e) => tracing::warn!(error = %e, "host frame dropped"),
                    }
                }

                _ = hb.ping_due() => {
                    if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }

                _ = tokio::time::sleep(IDLE_CHECK) => {
                    if hb.idle_expired() {
                        tracing::warn!("host idle timeout");
                        break;
                    }
                }
            }
        }

        slot.begin_close(lease);
        dispatcher.host_disconnected(lease.generation());
        slot.release(lease);
        tracing::info!("host executor disconnected");
    }
    .instrument(span)
    .await
}
