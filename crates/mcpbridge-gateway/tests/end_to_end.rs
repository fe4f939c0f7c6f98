#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use mcpbridge_executor::{client, Executor, SceneHost};
use mcpbridge_gateway::app_state::AppState;
use mcpbridge_gateway::config::BridgeConfig;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_bridge() -> (SocketAddr, AppState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(BridgeConfig::default()).unwrap();

    let served = state.clone();
    tokio::spawn(async move {
        mcpbridge_gateway::serve(listener, served, std::future::pending()).await
    });
    (addr, state)
}

async fn attach_demo_host(addr: SocketAddr, state: &AppState) {
    let executor = Arc::new(Executor::new(Arc::new(SceneHost::demo())));
    let url = format!("ws://{addr}/v1/host");
    tokio::spawn(async move { client::run(&url, executor).await });

    for _ in 0..200 {
        if state.is_ready() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("host never attached");
}

async fn controller(addr: SocketAddr, path: &str) -> Ws {
    let (ws, _) = connect_async(format!("ws://{addr}{path}")).await.unwrap();
    ws
}

/// Next text frame, skipping heartbeat traffic.
async fn next_json(ws: &mut Ws) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("no frame within 5s")
            .expect("stream ended")
            .expect("read failed");
        match msg {
            Message::Text(s) => return serde_json::from_str(&s).unwrap(),
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame {other:?}"),
        }
    }
}

async fn call(ws: &mut Ws, req: Value) -> Value {
    ws.send(Message::Text(req.to_string())).await.unwrap();
    next_json(ws).await
}

async fn http_get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let req = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(req.as_bytes()).await.unwrap();
    let mut buf = String::new();
    stream.read_to_string(&mut buf).await.unwrap();
    buf
}

#[tokio::test]
async fn property_read_round_trips_through_executor() {
    let (addr, state) = start_bridge().await;
    attach_demo_host(addr, &state).await;
    let mut ws = controller(addr, "/").await;

    let resp = call(
        &mut ws,
        json!({
            "id": "t1",
            "command": "GetNodeProperty",
            "params": {"node_path": "Root/Player", "property_name": "position"},
        }),
    )
    .await;

    assert_eq!(resp["id"], "t1");
    assert_eq!(resp["status"], "success");
    assert_eq!(resp["data"]["node_path"], "Root/Player");
    assert_eq!(resp["data"]["property_value"], json!({"x": 100.0, "y": 200.0}));
    assert!(resp["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn missing_command_is_rejected_by_bridge() {
    let (addr, state) = start_bridge().await;
    attach_demo_host(addr, &state).await;
    let mut ws = controller(addr, "/v1/ws").await;

    let resp = call(&mut ws, json!({"id": "t2", "params": {}})).await;
    assert_eq!(resp["id"], "t2");
    assert_eq!(resp["status"], "error");
    assert_eq!(resp["error"], "Missing 'command' field in request");
}

#[tokio::test]
async fn commands_fail_fast_without_host() {
    let (addr, _state) = start_bridge().await;
    let mut ws = controller(addr, "/").await;

    let resp = call(&mut ws, json!({"id": "t3", "command": "GetProjectInfo"})).await;
    assert_eq!(resp["id"], "t3");
    assert_eq!(resp["error"], "Executor not initialized");
}

#[tokio::test]
async fn host_errors_are_relayed_verbatim() {
    let (addr, state) = start_bridge().await;
    attach_demo_host(addr, &state).await;
    let mut ws = controller(addr, "/").await;

    let resp = call(
        &mut ws,
        json!({"id": "t4", "command": "RemoveNode", "params": {"node_path": "Root/Ghost"}}),
    )
    .await;
    assert_eq!(resp["id"], "t4");
    assert_eq!(resp["status"], "error");
    assert_eq!(resp["error"], "Node not found: Root/Ghost");
}

#[tokio::test]
async fn mutation_is_visible_to_later_reads() {
    let (addr, state) = start_bridge().await;
    attach_demo_host(addr, &state).await;
    let mut ws = controller(addr, "/").await;

    let set = call(
        &mut ws,
        json!({
            "id": "s1",
            "command": "SetNodeProperty",
            "params": {
                "node_path": "Root/Player",
                "property_name": "position",
                "property_value": {"x": 5, "y": 6},
            },
        }),
    )
    .await;
    assert_eq!(set["status"], "success");

    let get = call(
        &mut ws,
        json!({
            "id": "s2",
            "command": "GetNodeProperty",
            "params": {"node_path": "Root/Player", "property_name": "position"},
        }),
    )
    .await;
    assert_eq!(get["data"]["property_value"], json!({"x": 5.0, "y": 6.0}));
}

#[tokio::test]
async fn binary_frames_get_parse_error() {
    let (addr, _state) = start_bridge().await;
    let mut ws = controller(addr, "/").await;

    ws.send(Message::Binary(vec![0xde, 0xad])).await.unwrap();
    let resp = next_json(&mut ws).await;
    assert_eq!(resp["status"], "error");
    assert!(resp["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid JSON: binary frames are not supported"));
}

#[tokio::test]
async fn readiness_follows_host_connection() {
    let (addr, state) = start_bridge().await;

    let before = http_get(addr, "/readyz").await;
    assert!(before.starts_with("HTTP/1.1 503"));
    assert!(before.contains("host not connected"));

    attach_demo_host(addr, &state).await;
    let after = http_get(addr, "/readyz").await;
    assert!(after.starts_with("HTTP/1.1 200"));

    let health = http_get(addr, "/healthz").await;
    assert!(health.starts_with("HTTP/1.1 200"));

    let metrics = http_get(addr, "/metrics").await;
    assert!(metrics.contains("bridge_host_connected 1"));
}
