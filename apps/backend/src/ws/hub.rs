//! Connection registry and per-room replay buffer for the sync layer.

use std::collections::{HashSet, VecDeque};

use actix::prelude::*;
use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::domain::events::SessionEvent;
use crate::domain::state::RoomId;
use crate::ws::protocol::Topic;
use crate::ws::session::HubEvent;

/// Catch-up result for a reconnecting client.
#[derive(Debug, Clone, PartialEq)]
pub enum CatchUp {
    /// The exact gap, in sequence order, no duplicates.
    Events(Vec<SessionEvent>),
    /// The gap exceeds the buffer; the client needs a full snapshot.
    SnapshotRequired,
}

struct Connection {
    recipient: Recipient<HubEvent>,
    topics: HashSet<Topic>,
}

pub struct WsRegistry {
    connections: DashMap<Uuid, Connection>,
    topics: DashMap<Topic, HashSet<Uuid>>,
    buffers: DashMap<RoomId, RwLock<VecDeque<SessionEvent>>>,
    capacity: usize,
}

impl WsRegistry {
    /// `capacity` bounds the per-room replay buffer; it must cover the
    /// longest expected disconnect.
    pub fn new(capacity: usize) -> Self {
        Self {
            connections: DashMap::new(),
            topics: DashMap::new(),
            buffers: DashMap::new(),
            capacity,
        }
    }

    pub fn register_connection(&self, conn_id: Uuid, recipient: Recipient<HubEvent>) {
        self.connections.insert(
            conn_id,
            Connection {
                recipient,
                topics: HashSet::new(),
            },
        );
    }

    pub fn unregister_connection(&self, conn_id: Uuid) {
        if let Some((_, conn)) = self.connections.remove(&conn_id) {
            for topic in conn.topics {
                let now_empty = match self.topics.get_mut(&topic) {
                    Some(mut subs) => {
                        subs.remove(&conn_id);
                        subs.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    self.topics.remove(&topic);
                }
            }
        }
    }

    pub fn subscribe(&self, conn_id: Uuid, topic: Topic) {
        if let Some(mut conn) = self.connections.get_mut(&conn_id) {
            conn.topics.insert(topic);
        }
        self.topics.entry(topic).or_default().insert(conn_id);
    }

    pub fn unsubscribe(&self, conn_id: Uuid, topic: &Topic) {
        if let Some(mut conn) = self.connections.get_mut(&conn_id) {
            conn.topics.remove(topic);
        }
        if let Some(mut subs) = self.topics.get_mut(topic) {
            subs.remove(&conn_id);
        }
    }

    /// Append to the room's replay buffer and fan out to current
    /// subscribers. Per-connection delivery goes through the actix mailbox,
    /// which preserves the publish order — no reordering per subscriber.
    pub fn publish(&self, room_id: RoomId, events: &[SessionEvent]) {
        if events.is_empty() {
            return;
        }
        {
            let buffer = self
                .buffers
                .entry(room_id)
                .or_insert_with(|| RwLock::new(VecDeque::new()));
            let mut buf = buffer.write();
            for event in events {
                if buf.len() == self.capacity {
                    buf.pop_front();
                }
                buf.push_back(event.clone());
            }
        }
        let topic = Topic::Session { id: room_id };
        if let Some(subs) = self.topics.get(&topic) {
            for conn_id in subs.iter() {
                if let Some(conn) = self.connections.get(conn_id) {
                    for event in events {
                        conn.recipient.do_send(HubEvent::Event {
                            event: event.clone(),
                        });
                    }
                }
            }
        }
    }

    /// Replay everything after `last_seen`, or signal snapshot fallback
    /// when the requested gap starts before the buffer does.
    pub fn catch_up(&self, room_id: RoomId, last_seen: u64) -> CatchUp {
        let Some(buffer) = self.buffers.get(&room_id) else {
            return CatchUp::SnapshotRequired;
        };
        let buf = buffer.read();
        let Some(front) = buf.front() else {
            return CatchUp::SnapshotRequired;
        };
        if last_seen + 1 < front.seq {
            return CatchUp::SnapshotRequired;
        }
        CatchUp::Events(buf.iter().filter(|e| e.seq > last_seen).cloned().collect())
    }

    /// Room teardown: the replay buffer and subscriber set go away.
    pub fn drop_room(&self, room_id: RoomId) {
        self.buffers.remove(&room_id);
        self.topics.remove(&Topic::Session { id: room_id });
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{CatchUp, WsRegistry};
    use crate::domain::events::{EventKind, SessionEvent};

    fn event(seq: u64) -> SessionEvent {
        SessionEvent {
            seq,
            room_id: 7,
            kind: EventKind::RevoteStarted { day: 1 },
        }
    }

    #[test]
    fn catch_up_returns_exact_gap_in_order() {
        let registry = WsRegistry::new(32);
        let events: Vec<_> = (1..=15).map(event).collect();
        registry.publish(7, &events);

        let CatchUp::Events(replay) = registry.catch_up(7, 10) else {
            panic!("gap fits the buffer");
        };
        let seqs: Vec<u64> = replay.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![11, 12, 13, 14, 15]);
    }

    #[test]
    fn catch_up_with_nothing_missed_is_empty() {
        let registry = WsRegistry::new(32);
        registry.publish(7, &[event(1), event(2)]);
        assert_eq!(registry.catch_up(7, 2), CatchUp::Events(Vec::new()));
    }

    #[test]
    fn gap_older_than_buffer_requires_snapshot() {
        let registry = WsRegistry::new(4);
        let events: Vec<_> = (1..=10).map(event).collect();
        registry.publish(7, &events);

        // Buffer now holds 7..=10; a client at seq 2 missed 3..=6 forever.
        assert_eq!(registry.catch_up(7, 2), CatchUp::SnapshotRequired);
    }

    #[test]
    fn unknown_room_requires_snapshot() {
        let registry = WsRegistry::new(4);
        assert_eq!(registry.catch_up(99, 0), CatchUp::SnapshotRequired);
    }
}
