//! The connection supervisor state machine.
//!
//! `disconnected -> connecting -> connected`; a drop moves through
//! `reconnecting -> connecting` with exponential backoff, and exhausted
//! retries land in `error` until a manual retry. Every successful connect
//! resets the attempt counter and issues a catch-up subscribe carrying the
//! last-seen sequence number, so missed events are re-delivered and
//! duplicates across the reconnect race are dropped here.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, timeout, Instant};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::backoff;
use crate::protocol::{ClientMsg, Event, ServerMsg, Topic, PROTOCOL_VERSION};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    /// Retries exhausted; waiting for a manual retry.
    Error,
}

/// Coarse quality signal for the UI layer: connectivity issues surface
/// here, never as game-logic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionQuality {
    Good,
    Degraded,
    Bad,
}

impl ConnectionStatus {
    pub fn quality(self) -> ConnectionQuality {
        match self {
            ConnectionStatus::Connected => ConnectionQuality::Good,
            ConnectionStatus::Connecting | ConnectionStatus::Reconnecting => {
                ConnectionQuality::Degraded
            }
            ConnectionStatus::Disconnected | ConnectionStatus::Error => ConnectionQuality::Bad,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    pub url: String,
    pub room_id: i64,
    /// Heartbeat send cadence while connected.
    pub heartbeat_interval: Duration,
    /// Missing any traffic for this long counts as a drop.
    pub heartbeat_timeout: Duration,
    /// Consecutive failed attempts before landing in `error`.
    pub max_attempts: u32,
}

impl SupervisorConfig {
    pub fn new(url: impl Into<String>, room_id: i64) -> Self {
        Self {
            url: url.into(),
            room_id,
            heartbeat_interval: Duration::from_secs(15),
            heartbeat_timeout: Duration::from_secs(30),
            max_attempts: 8,
        }
    }
}

/// Updates surfaced to the UI layer, already deduplicated by sequence
/// number.
#[derive(Debug, Clone)]
pub enum ChannelUpdate {
    /// Full state: initial subscribe, or the gap exceeded the server's
    /// replay buffer.
    Snapshot {
        version: u64,
        session: Value,
        viewer: Value,
    },
    /// One sequenced event past the last seen.
    Event(Event),
}

pub struct SupervisorHandle {
    status: watch::Receiver<ConnectionStatus>,
    updates: mpsc::Receiver<ChannelUpdate>,
    retry: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl SupervisorHandle {
    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn quality(&self) -> ConnectionQuality {
        self.status().quality()
    }

    /// Watchable status stream for the UI layer.
    pub fn status_stream(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub async fn next_update(&mut self) -> Option<ChannelUpdate> {
        self.updates.recv().await
    }

    /// Manual retry, always available. Wakes an exhausted supervisor and
    /// skips any backoff delay in progress.
    pub fn retry(&self) {
        let _ = self.retry.try_send(());
    }

    pub fn shutdown(self) {
        self.task.abort();
    }
}

pub struct ConnectionSupervisor;

impl ConnectionSupervisor {
    /// Spawn the supervision loop. The handle is the UI layer's only view
    /// of the channel.
    pub fn spawn(config: SupervisorConfig) -> SupervisorHandle {
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Disconnected);
        let (updates_tx, updates_rx) = mpsc::channel(64);
        let (retry_tx, retry_rx) = mpsc::channel(1);
        let task = tokio::spawn(run(config, status_tx, updates_tx, retry_rx));
        SupervisorHandle {
            status: status_rx,
            updates: updates_rx,
            retry: retry_tx,
            task,
        }
    }
}

enum DriveExit {
    /// The updates receiver is gone; the supervisor has no consumer left.
    UpdatesClosed,
}

async fn run(
    config: SupervisorConfig,
    status_tx: watch::Sender<ConnectionStatus>,
    updates_tx: mpsc::Sender<ChannelUpdate>,
    mut retry_rx: mpsc::Receiver<()>,
) {
    let mut last_seen: Option<u64> = None;
    let mut attempts: u32 = 0;

    loop {
        status_tx.send_replace(ConnectionStatus::Connecting);
        match connect_and_drive(&config, &status_tx, &updates_tx, &mut last_seen, &mut attempts)
            .await
        {
            Ok(DriveExit::UpdatesClosed) => {
                status_tx.send_replace(ConnectionStatus::Disconnected);
                return;
            }
            Err(reason) => {
                attempts += 1;
                if attempts >= config.max_attempts {
                    warn!(
                        attempts,
                        error = %reason,
                        "retries exhausted, waiting for manual retry"
                    );
                    status_tx.send_replace(ConnectionStatus::Error);
                    if retry_rx.recv().await.is_none() {
                        return;
                    }
                    attempts = 0;
                    continue;
                }
                let delay = backoff::retry_delay(attempts);
                warn!(
                    attempt = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %reason,
                    "connection dropped, backing off"
                );
                status_tx.send_replace(ConnectionStatus::Reconnecting);
                // A manual retry during the backoff skips the remaining delay.
                let _ = timeout(delay, retry_rx.recv()).await;
            }
        }
    }
}

async fn connect_and_drive(
    config: &SupervisorConfig,
    status_tx: &watch::Sender<ConnectionStatus>,
    updates_tx: &mpsc::Sender<ChannelUpdate>,
    last_seen: &mut Option<u64>,
    attempts: &mut u32,
) -> Result<DriveExit, String> {
    let (mut stream, _) = connect_async(config.url.as_str())
        .await
        .map_err(|err| err.to_string())?;

    // Handshake, then catch up from the last-seen sequence number.
    send_json(&mut stream, &ClientMsg::Hello {
        protocol: PROTOCOL_VERSION,
    })
    .await?;
    send_json(&mut stream, &ClientMsg::Subscribe {
        topic: Topic::Session { id: config.room_id },
        last_seen_seq: *last_seen,
    })
    .await?;

    // Attempt counter resets to zero immediately on a successful connect.
    *attempts = 0;
    status_tx.send_replace(ConnectionStatus::Connected);
    info!(room_id = config.room_id, last_seen = ?last_seen, "channel connected");

    let mut heartbeat = interval(config.heartbeat_interval);
    let mut last_traffic = Instant::now();

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if last_traffic.elapsed() > config.heartbeat_timeout {
                    return Err("heartbeat timed out".to_string());
                }
                stream
                    .send(Message::Ping(Vec::new().into()))
                    .await
                    .map_err(|err| err.to_string())?;
            }
            incoming = stream.next() => {
                let Some(incoming) = incoming else {
                    return Err("stream ended".to_string());
                };
                let message = incoming.map_err(|err| err.to_string())?;
                last_traffic = Instant::now();
                match message {
                    Message::Pong(_) => {}
                    Message::Ping(payload) => {
                        stream
                            .send(Message::Pong(payload))
                            .await
                            .map_err(|err| err.to_string())?;
                    }
                    Message::Text(text) => {
                        let parsed: ServerMsg = serde_json::from_str(&text)
                            .map_err(|err| format!("malformed server message: {err}"))?;
                        if let Some(update) = accept(parsed, last_seen) {
                            if updates_tx.send(update).await.is_err() {
                                return Ok(DriveExit::UpdatesClosed);
                            }
                        }
                    }
                    Message::Close(_) => return Err("server closed the channel".to_string()),
                    _ => {}
                }
            }
        }
    }
}

/// Fold one server message into the last-seen cursor. Stale events (seq at
/// or below the cursor) are duplicates from the reconnect race and are
/// dropped here.
fn accept(message: ServerMsg, last_seen: &mut Option<u64>) -> Option<ChannelUpdate> {
    match message {
        ServerMsg::HelloAck { protocol, .. } => {
            debug!(protocol, "hello acknowledged");
            None
        }
        ServerMsg::Ack { message } => {
            debug!(%message, "server ack");
            None
        }
        ServerMsg::SessionState {
            version,
            session,
            viewer,
            ..
        } => {
            *last_seen = Some(version);
            Some(ChannelUpdate::Snapshot {
                version,
                session,
                viewer,
            })
        }
        ServerMsg::Event { event, .. } => {
            if last_seen.map(|seen| event.seq <= seen).unwrap_or(false) {
                debug!(seq = event.seq, "dropping duplicate event");
                return None;
            }
            *last_seen = Some(event.seq);
            Some(ChannelUpdate::Event(event))
        }
        ServerMsg::Error { code, message } => {
            warn!(%code, %message, "server error on channel");
            None
        }
    }
}

async fn send_json(stream: &mut WsStream, msg: &ClientMsg) -> Result<(), String> {
    let payload = serde_json::to_string(msg).map_err(|err| err.to_string())?;
    stream
        .send(Message::Text(payload.into()))
        .await
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::{ChannelUpdate, ConnectionQuality, ConnectionStatus};
    use crate::protocol::ServerMsg;

    #[test]
    fn quality_degrades_with_status() {
        assert_eq!(
            ConnectionStatus::Connected.quality(),
            ConnectionQuality::Good
        );
        assert_eq!(
            ConnectionStatus::Reconnecting.quality(),
            ConnectionQuality::Degraded
        );
        assert_eq!(ConnectionStatus::Error.quality(), ConnectionQuality::Bad);
    }

    #[test]
    fn stale_events_are_dropped_and_fresh_ones_advance_the_cursor() {
        let event = |seq: u64| -> ServerMsg {
            serde_json::from_str(&format!(
                r#"{{"type":"event","topic":{{"kind":"session","id":7}},"event":{{"seq":{seq},"room_id":7,"type":"revote_started","day":1}}}}"#
            ))
            .expect("valid wire message")
        };

        let mut last_seen = Some(10);
        assert!(super::accept(event(9), &mut last_seen).is_none());
        assert!(super::accept(event(10), &mut last_seen).is_none());
        let update = super::accept(event(11), &mut last_seen);
        assert!(matches!(update, Some(ChannelUpdate::Event(e)) if e.seq == 11));
        assert_eq!(last_seen, Some(11));
    }

    #[test]
    fn snapshot_resets_the_cursor_to_its_version() {
        let snapshot: ServerMsg = serde_json::from_str(
            r#"{"type":"session_state","topic":{"kind":"session","id":7},"version":42,"session":{},"viewer":{}}"#,
        )
        .expect("valid wire message");

        let mut last_seen = Some(3);
        let update = super::accept(snapshot, &mut last_seen);
        assert!(matches!(
            update,
            Some(ChannelUpdate::Snapshot { version: 42, .. })
        ));
        assert_eq!(last_seen, Some(42));
    }
}
