//! Room registry: one lock per room, copy-on-write snapshots for readers.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};

use crate::domain::snapshot::{self, SessionSnapshot};
use crate::domain::state::{RoomId, SessionState};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};

/// Handle to one room. The state mutex serializes all mutations — the
/// orchestrator is the single writer — while readers take the published
/// snapshot without touching it. Different rooms are fully independent.
pub struct RoomHandle {
    pub(crate) state: Mutex<SessionState>,
    snapshot: RwLock<Arc<SessionSnapshot>>,
    /// Last successful mutation, read by the stall watchdog.
    pub(crate) last_progress: Mutex<Instant>,
}

impl RoomHandle {
    fn new(state: SessionState) -> Self {
        let snap = Arc::new(snapshot::snapshot(&state));
        Self {
            state: Mutex::new(state),
            snapshot: RwLock::new(snap),
            last_progress: Mutex::new(Instant::now()),
        }
    }

    /// Lock-free read of the current public view.
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.snapshot.read().clone()
    }

    pub(crate) fn store_snapshot(&self, snap: Arc<SessionSnapshot>) {
        *self.snapshot.write() = snap;
    }
}

#[derive(Default)]
pub struct SessionRegistry {
    rooms: DashMap<RoomId, Arc<RoomHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh room. Fails if the room already has a session.
    pub(crate) fn insert(&self, state: SessionState) -> Result<Arc<RoomHandle>, DomainError> {
        let room_id = state.room_id;
        match self.rooms.entry(room_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(DomainError::conflict(
                ConflictKind::SessionAlreadyStarted,
                format!("room {room_id} already has a running session"),
            )),
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                let handle = Arc::new(RoomHandle::new(state));
                vacant.insert(handle.clone());
                Ok(handle)
            }
        }
    }

    pub fn get(&self, room_id: RoomId) -> Result<Arc<RoomHandle>, DomainError> {
        self.rooms
            .get(&room_id)
            .map(|handle| handle.clone())
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Session,
                    format!("no session for room {room_id}"),
                )
            })
    }

    pub fn remove(&self, room_id: RoomId) -> Option<Arc<RoomHandle>> {
        self.rooms.remove(&room_id).map(|(_, handle)| handle)
    }

    pub fn contains(&self, room_id: RoomId) -> bool {
        self.rooms.contains_key(&room_id)
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|entry| *entry.key()).collect()
    }
}
