use serde::{Deserialize, Serialize};

use crate::domain::actions::EliminationCause;
use crate::domain::roles::{Faction, Role};
use crate::domain::state::{ParticipantId, Phase, RoomId};

/// Immutable, per-room monotonically sequenced record of one state change.
/// Produced by the orchestrator, fanned out by the sync layer, replayed by
/// sequence number on catch-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionEvent {
    pub seq: u64,
    pub room_id: RoomId,
    #[serde(flatten)]
    pub kind: EventKind,
}

/// Event payloads are public-safe: they never reveal a living participant's
/// role, and never carry a night action's kind or target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    SessionStarted {
        turn_order: Vec<ParticipantId>,
    },
    PhaseChanged {
        phase: Phase,
        day: u8,
        round: u8,
    },
    SpeakerChanged {
        speaker: ParticipantId,
        round: u8,
    },
    Speech {
        actor: ParticipantId,
        text: String,
    },
    /// A stalled turn was moved forward on the participant's behalf.
    TurnForced {
        participant: ParticipantId,
        phase: Phase,
    },
    VoteCast {
        voter: ParticipantId,
        target: ParticipantId,
        ballot: u8,
    },
    RevoteStarted {
        day: u8,
    },
    VoteResolved {
        eliminated: Option<ParticipantId>,
        day: u8,
    },
    NightActionSubmitted {
        actor: ParticipantId,
        night: u8,
    },
    /// Roles are revealed on death.
    Eliminated {
        participant: ParticipantId,
        role: Role,
        cause: EliminationCause,
        day: u8,
    },
    WinRecorded {
        faction: Faction,
    },
    SessionClosed,
}
