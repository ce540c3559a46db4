//! Roster/persona store seam. The real store lives outside the core; the
//! in-memory implementation backs the binary and the tests.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::assign::assign_roles;
use crate::domain::roles::Role;
use crate::domain::state::RoomId;
use crate::errors::domain::{DomainError, NotFoundKind};

/// One roster slot, before roles are assigned.
#[derive(Debug, Clone)]
pub struct RosterEntry {
    pub name: String,
    pub is_human: bool,
    /// Opaque persona blob, passed through to the participant.
    pub persona: Option<String>,
}

#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn get_roster(&self, room_id: RoomId) -> Result<Vec<RosterEntry>, DomainError>;

    /// Role map aligned with the roster order. Called once, at session start.
    async fn assign_roles(&self, room_id: RoomId) -> Result<Vec<Role>, DomainError>;
}

/// In-memory store with deterministic, seeded role assignment.
#[derive(Default)]
pub struct InMemoryRosterStore {
    rosters: DashMap<RoomId, Vec<RosterEntry>>,
    role_seed: u64,
}

impl InMemoryRosterStore {
    pub fn new(role_seed: u64) -> Self {
        Self {
            rosters: DashMap::new(),
            role_seed,
        }
    }

    pub fn insert(&self, room_id: RoomId, entries: Vec<RosterEntry>) {
        self.rosters.insert(room_id, entries);
    }
}

#[async_trait]
impl RosterStore for InMemoryRosterStore {
    async fn get_roster(&self, room_id: RoomId) -> Result<Vec<RosterEntry>, DomainError> {
        self.rosters
            .get(&room_id)
            .map(|entries| entries.clone())
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Roster,
                    format!("no roster registered for room {room_id}"),
                )
            })
    }

    async fn assign_roles(&self, room_id: RoomId) -> Result<Vec<Role>, DomainError> {
        let roster = self.get_roster(room_id).await?;
        // Mix the room id into the seed so each room shuffles differently.
        assign_roles(roster.len(), self.role_seed ^ room_id as u64)
    }
}
