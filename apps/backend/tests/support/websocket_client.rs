// WebSocket client utilities for testing

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// WebSocket test client
pub struct WebSocketClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WebSocketClient {
    /// Connect to a WebSocket endpoint
    pub async fn connect(url: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let (stream, _) = connect_async(url).await?;
        Ok(Self { stream })
    }

    /// Connect to a WebSocket endpoint, retrying until success or timeout.
    pub async fn connect_retry(
        url: &str,
        timeout: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let start = tokio::time::Instant::now();
        loop {
            match connect_async(url).await {
                Ok((stream, _)) => return Ok(Self { stream }),
                Err(err) => {
                    if start.elapsed() >= timeout {
                        return Err(Box::new(err));
                    }
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            }
        }
    }

    /// Send a text message
    pub async fn send(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error>> {
        self.stream
            .send(Message::Text(text.to_string().into()))
            .await?;
        Ok(())
    }

    /// Close the connection
    pub async fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.stream.close(None).await?;
        Ok(())
    }

    /// Receive the next message with a timeout
    pub async fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Message>, Box<dyn std::error::Error>> {
        tokio::time::timeout(timeout, self.stream.next())
            .await
            .map_err(|_| "Timeout waiting for message")?
            .transpose()
            .map_err(|e| e.into())
    }

    /// Parse the next text message as JSON, skipping control frames.
    pub async fn recv_json_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<Value>, Box<dyn std::error::Error>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline
                .checked_duration_since(tokio::time::Instant::now())
                .ok_or("Timeout waiting for message")?;
            match self.recv_timeout(remaining).await? {
                Some(Message::Text(text)) => {
                    let json: Value = serde_json::from_str(&text)?;
                    return Ok(Some(json));
                }
                Some(Message::Close(_)) | None => return Ok(None),
                Some(_) => continue,
            }
        }
    }

    /// Handshake: hello and wait for the acknowledgement.
    pub async fn hello(&mut self) -> Result<Value, Box<dyn std::error::Error>> {
        self.send(&json!({ "type": "hello", "protocol": 1 }).to_string())
            .await?;
        let ack = self
            .recv_json_timeout(Duration::from_secs(5))
            .await?
            .ok_or("connection closed before hello_ack")?;
        Ok(ack)
    }

    /// Subscribe to a session topic, optionally with a last-seen sequence
    /// number for catch-up. Returns the ack; subsequent frames are the
    /// snapshot or the replayed events.
    pub async fn subscribe_session(
        &mut self,
        room_id: i64,
        last_seen_seq: Option<u64>,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        let mut msg = json!({
            "type": "subscribe",
            "topic": { "kind": "session", "id": room_id },
        });
        if let Some(seq) = last_seen_seq {
            msg["last_seen_seq"] = json!(seq);
        }
        self.send(&msg.to_string()).await?;
        let ack = self
            .recv_json_timeout(Duration::from_secs(5))
            .await?
            .ok_or("connection closed before subscribe ack")?;
        Ok(ack)
    }
}
