//! Copy-on-write public view of a session, plus the per-viewer private
//! projection delivered alongside it.

use serde::{Deserialize, Serialize};

use crate::domain::roles::{Faction, Role};
use crate::domain::state::{ParticipantId, Phase, RoomId, SessionState};

/// Public roster entry. `role` is present only for dead participants or
/// once the session is finished.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantView {
    pub id: ParticipantId,
    pub name: String,
    pub is_human: bool,
    pub alive: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoteView {
    pub voter: ParticipantId,
    pub target: ParticipantId,
}

/// Immutable public view of one room, published copy-on-write so reads
/// never contend with the orchestrator's lock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub room_id: RoomId,
    pub phase: Phase,
    pub day: u8,
    pub round: u8,
    pub turn_order: Vec<ParticipantId>,
    pub current_speaker: Option<ParticipantId>,
    pub participants: Vec<ParticipantView>,
    /// Ballots cast so far, retained for tally display while the vote phase
    /// is active; cleared when it exits.
    pub votes: Vec<VoteView>,
    pub revote: bool,
    pub winner: Option<Faction>,
    /// Sequence number of the last event applied to this view.
    pub version: u64,
}

/// Private projection for one viewer: own role plus accumulated
/// investigation results. Delivered per connection, never broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerState {
    pub participant: Option<ParticipantId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role: Option<Role>,
    pub investigations: Vec<InvestigationView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvestigationView {
    pub target: ParticipantId,
    pub faction: Faction,
    pub night: u8,
}

pub fn snapshot(state: &SessionState) -> SessionSnapshot {
    let finished = state.phase == Phase::Finished;
    SessionSnapshot {
        room_id: state.room_id,
        phase: state.phase,
        day: state.day,
        round: state.round,
        turn_order: state.turn_order.clone(),
        current_speaker: state.current_speaker(),
        participants: state
            .participants
            .iter()
            .map(|p| ParticipantView {
                id: p.id,
                name: p.name.clone(),
                is_human: p.is_human,
                alive: p.alive,
                role: (finished || !p.alive).then_some(p.role),
            })
            .collect(),
        votes: state
            .vote
            .votes
            .iter()
            .map(|v| VoteView {
                voter: v.voter,
                target: v.target,
            })
            .collect(),
        revote: state.vote.revote,
        winner: state.winner,
        version: state.next_seq.saturating_sub(1),
    }
}

pub fn viewer_state(state: &SessionState, viewer: Option<ParticipantId>) -> ViewerState {
    let role = viewer
        .and_then(|id| state.participant(id))
        .map(|p| p.role);
    let investigations = viewer
        .map(|id| {
            state
                .investigations
                .iter()
                .filter(|i| i.seer == id)
                .map(|i| InvestigationView {
                    target: i.target,
                    faction: i.faction,
                    night: i.night,
                })
                .collect()
        })
        .unwrap_or_default();
    ViewerState {
        participant: viewer,
        role,
        investigations,
    }
}
