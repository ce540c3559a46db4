use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::actions::{NightAction, Vote};
use crate::domain::events::{EventKind, SessionEvent};
use crate::domain::roles::{Faction, Participant};

pub type ParticipantId = u8; // roster index
pub type RoomId = i64;

/// Overall session progression phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Room created but the session has not started.
    Waiting,
    /// Living participants speak in turn order for a bounded number of rounds.
    DayDiscussion,
    /// Living participants vote to eliminate someone.
    DayVote,
    /// Role-restricted actions are submitted, resolved atomically at dawn.
    Night,
    /// Terminal: a faction has won (or the room was closed).
    Finished,
}

/// Per-day vote container. Cleared whenever the vote phase exits, including
/// into a revote.
#[derive(Debug, Clone, Default)]
pub struct VoteState {
    pub votes: Vec<Vote>,
    /// Voters whose missing ballot was force-advanced to an abstention.
    pub abstained: BTreeSet<ParticipantId>,
    /// Set after the first tie; a second consecutive tie resolves to no
    /// elimination.
    pub revote: bool,
}

/// Per-night action container. Consumed and discarded at dawn.
#[derive(Debug, Clone, Default)]
pub struct NightState {
    pub actions: Vec<NightAction>,
    /// Actors whose missing action was force-advanced to a no-op.
    pub forced: BTreeSet<ParticipantId>,
}

/// A completed investigation. Private to the investigating seer; never part
/// of a broadcast event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Investigation {
    pub seer: ParticipantId,
    pub target: ParticipantId,
    pub faction: Faction,
    pub night: u8,
}

/// Entire per-room container, sufficient for pure domain operations.
///
/// Owned exclusively by the orchestrator and mutated only through validated
/// transitions; everyone else reads copy-on-write snapshots.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub room_id: RoomId,
    pub phase: Phase,
    /// Day counter, 1-based once the session starts.
    pub day: u8,
    /// Discussion sub-round, 1-based, bounded by config.
    pub round: u8,
    /// Speaking order, fixed at discussion-phase entry.
    pub turn_order: Vec<ParticipantId>,
    pub turn_index: usize,
    /// Roster in id order; entries are never removed.
    pub participants: Vec<Participant>,
    pub night: NightState,
    pub vote: VoteState,
    /// Seer results accumulated across the session.
    pub investigations: Vec<Investigation>,
    pub winner: Option<Faction>,
    /// Next event sequence number for this room (1-based, monotonic).
    pub next_seq: u64,
}

impl SessionState {
    pub fn new(room_id: RoomId, participants: Vec<Participant>) -> Self {
        Self {
            room_id,
            phase: Phase::Waiting,
            day: 0,
            round: 0,
            turn_order: Vec::new(),
            turn_index: 0,
            participants,
            night: NightState::default(),
            vote: VoteState::default(),
            investigations: Vec::new(),
            winner: None,
            next_seq: 1,
        }
    }

    pub fn participant(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.get(id as usize)
    }

    pub fn participant_mut(&mut self, id: ParticipantId) -> Option<&mut Participant> {
        self.participants.get_mut(id as usize)
    }

    pub fn living(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.alive)
    }

    pub fn is_alive(&self, id: ParticipantId) -> bool {
        self.participant(id).map(|p| p.alive).unwrap_or(false)
    }

    /// Participant expected to speak, if the discussion phase is active.
    pub fn current_speaker(&self) -> Option<ParticipantId> {
        if self.phase != Phase::DayDiscussion {
            return None;
        }
        self.turn_order.get(self.turn_index).copied()
    }

    /// Current ballot index: 0 for the first vote of the day, 1 for the revote.
    pub fn ballot(&self) -> u8 {
        u8::from(self.vote.revote)
    }

    /// Append a sequenced event for this room.
    pub fn push_event(&mut self, events: &mut Vec<SessionEvent>, kind: EventKind) {
        events.push(SessionEvent {
            seq: self.next_seq,
            room_id: self.room_id,
            kind,
        });
        self.next_seq += 1;
    }
}

/// Win check, evaluated once per elimination batch. Idempotent; the first
/// satisfied condition wins.
pub fn win_check(participants: &[Participant]) -> Option<Faction> {
    let werewolves = participants
        .iter()
        .filter(|p| p.alive && p.role.faction() == Faction::Werewolves)
        .count();
    let others = participants
        .iter()
        .filter(|p| p.alive && p.role.faction() != Faction::Werewolves)
        .count();

    if werewolves == 0 {
        Some(Faction::Villagers)
    } else if werewolves >= others {
        Some(Faction::Werewolves)
    } else {
        None
    }
}
