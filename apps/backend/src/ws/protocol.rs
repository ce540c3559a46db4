use serde::{Deserialize, Serialize};

use crate::domain::events::SessionEvent;
use crate::domain::snapshot::{SessionSnapshot, ViewerState};
use crate::domain::state::{ParticipantId, RoomId};

pub const PROTOCOL_VERSION: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Topic {
    #[serde(rename_all = "snake_case")]
    Session { id: RoomId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    Hello {
        protocol: i32,
    },
    /// `last_seen_seq` asks for catch-up: the server replays the missed
    /// events in order, or falls back to a full snapshot when the gap
    /// exceeds the replay buffer.
    Subscribe {
        topic: Topic,
        #[serde(default)]
        last_seen_seq: Option<u64>,
    },
    Unsubscribe {
        topic: Topic,
    },
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    HelloAck {
        protocol: i32,
        participant: Option<ParticipantId>,
    },

    Ack {
        message: &'static str,
    },

    SessionState {
        topic: Topic,
        version: u64,
        session: SessionSnapshot,
        viewer: ViewerState,
    },

    Event {
        topic: Topic,
        event: SessionEvent,
    },

    Error {
        code: ErrorCode,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    BadProtocol,
    BadTopic,
    BadRequest,
    NotFound,
    Forbidden,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BadProtocol => "bad_protocol",
            ErrorCode::BadTopic => "bad_topic",
            ErrorCode::BadRequest => "bad_request",
            ErrorCode::NotFound => "not_found",
            ErrorCode::Forbidden => "forbidden",
        }
    }
}
