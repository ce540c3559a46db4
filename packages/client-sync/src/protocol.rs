//! Wire mirror of the server protocol.
//!
//! The contract is framing-agnostic: ordered, at-least-once delivery of
//! JSON envelopes with client-supplied last-seen sequence numbers. Session
//! payloads stay opaque `serde_json::Value`s here; interpreting them is the
//! UI layer's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PROTOCOL_VERSION: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topic {
    #[serde(rename_all = "snake_case")]
    Session { id: i64 },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Hello {
        protocol: i32,
    },
    Subscribe {
        topic: Topic,
        #[serde(skip_serializing_if = "Option::is_none")]
        last_seen_seq: Option<u64>,
    },
    Unsubscribe {
        topic: Topic,
    },
}

/// One sequenced session event. The payload keeps whatever fields the
/// server put next to the sequence number.
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub seq: u64,
    pub room_id: i64,
    #[serde(flatten)]
    pub payload: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    HelloAck {
        protocol: i32,
        #[serde(default)]
        participant: Option<u8>,
    },
    Ack {
        message: String,
    },
    SessionState {
        topic: Topic,
        version: u64,
        session: Value,
        viewer: Value,
    },
    Event {
        topic: Topic,
        event: Event,
    },
    Error {
        code: String,
        message: String,
    },
}
