// Supervisor integration tests against a scripted local WebSocket server.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use client_sync::{ChannelUpdate, ConnectionStatus, ConnectionSupervisor, SupervisorConfig};

const WAIT: Duration = Duration::from_secs(15);

async fn wait_until(
    status: &mut watch::Receiver<ConnectionStatus>,
    pred: impl Fn(ConnectionStatus) -> bool,
) {
    timeout(WAIT, async {
        loop {
            if pred(*status.borrow()) {
                return;
            }
            status.changed().await.expect("status channel stays open");
        }
    })
    .await
    .expect("status reached in time");
}

async fn send(ws: &mut WebSocketStream<TcpStream>, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("server write");
}

/// Read the hello + subscribe handshake, acknowledging both; returns the
/// subscribe's last_seen_seq.
async fn read_handshake(ws: &mut WebSocketStream<TcpStream>) -> Option<u64> {
    loop {
        let frame = ws
            .next()
            .await
            .expect("client stays connected")
            .expect("readable frame");
        let Message::Text(text) = frame else { continue };
        let value: Value = serde_json::from_str(&text).expect("client sends JSON");
        match value["type"].as_str() {
            Some("hello") => {
                send(ws, json!({ "type": "hello_ack", "protocol": 1 })).await;
            }
            Some("subscribe") => {
                let last_seen = value["last_seen_seq"].as_u64();
                send(ws, json!({ "type": "ack", "message": "subscribed" })).await;
                return last_seen;
            }
            _ => {}
        }
    }
}

fn event_json(seq: u64) -> Value {
    json!({
        "type": "event",
        "topic": { "kind": "session", "id": 7 },
        "event": { "seq": seq, "room_id": 7, "type": "speaker_changed", "speaker": 1, "round": 1 },
    })
}

#[tokio::test]
async fn reconnect_issues_catch_up_and_drops_replayed_duplicates() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (seen_tx, mut seen_rx) = mpsc::channel::<Option<u64>>(4);

    let server = tokio::spawn(async move {
        // First connection: snapshot at version 3, one event, then a hard drop.
        let (socket, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(socket).await.expect("ws handshake");
        let last_seen = read_handshake(&mut ws).await;
        seen_tx.send(last_seen).await.expect("report last_seen");
        send(
            &mut ws,
            json!({
                "type": "session_state",
                "topic": { "kind": "session", "id": 7 },
                "version": 3,
                "session": {},
                "viewer": {},
            }),
        )
        .await;
        send(&mut ws, event_json(4)).await;
        drop(ws);

        // Second connection: at-least-once delivery replays event 4, then 5.
        let (socket, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(socket).await.expect("ws handshake");
        let last_seen = read_handshake(&mut ws).await;
        seen_tx.send(last_seen).await.expect("report last_seen");
        send(&mut ws, event_json(4)).await;
        send(&mut ws, event_json(5)).await;

        // Stay alive, answering heartbeats, until the test tears down.
        while let Some(frame) = ws.next().await {
            if let Ok(Message::Ping(payload)) = frame {
                let _ = ws.send(Message::Pong(payload)).await;
            }
        }
    });

    let mut config = SupervisorConfig::new(format!("ws://{addr}"), 7);
    config.heartbeat_interval = Duration::from_millis(100);
    config.heartbeat_timeout = Duration::from_secs(5);
    let mut handle = ConnectionSupervisor::spawn(config);
    let mut status = handle.status_stream();

    wait_until(&mut status, |s| s == ConnectionStatus::Connected).await;
    // First subscribe has nothing to catch up from.
    assert_eq!(seen_rx.recv().await.expect("first handshake"), None);

    let update = timeout(WAIT, handle.next_update())
        .await
        .expect("update in time")
        .expect("channel open");
    assert!(matches!(update, ChannelUpdate::Snapshot { version: 3, .. }));

    let update = timeout(WAIT, handle.next_update())
        .await
        .expect("update in time")
        .expect("channel open");
    match update {
        ChannelUpdate::Event(event) => assert_eq!(event.seq, 4),
        other => panic!("expected event 4, got {other:?}"),
    }

    // The drop is noticed, the supervisor backs off and reconnects with the
    // last-seen sequence number.
    wait_until(&mut status, |s| s == ConnectionStatus::Reconnecting).await;
    wait_until(&mut status, |s| s == ConnectionStatus::Connected).await;
    assert_eq!(seen_rx.recv().await.expect("second handshake"), Some(4));

    // The replayed event 4 is a duplicate and is dropped; only 5 surfaces.
    let update = timeout(WAIT, handle.next_update())
        .await
        .expect("update in time")
        .expect("channel open");
    match update {
        ChannelUpdate::Event(event) => assert_eq!(event.seq, 5),
        other => panic!("expected event 5, got {other:?}"),
    }

    handle.shutdown();
    server.abort();
}

#[tokio::test]
async fn exhausted_retries_land_in_error_until_a_manual_retry() {
    // Bind, then drop the listener so every connect is refused.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let mut config = SupervisorConfig::new(format!("ws://{addr}"), 1);
    config.max_attempts = 2;
    let handle = ConnectionSupervisor::spawn(config);
    let mut status = handle.status_stream();

    wait_until(&mut status, |s| s == ConnectionStatus::Error).await;

    // Manual retry leaves the error state and runs the schedule again.
    handle.retry();
    wait_until(&mut status, |s| s != ConnectionStatus::Error).await;
    wait_until(&mut status, |s| s == ConnectionStatus::Error).await;

    handle.shutdown();
}
