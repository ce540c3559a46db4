use serde::{Deserialize, Serialize};

use crate::domain::state::ParticipantId;

/// Role-restricted actions available during the night phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightActionKind {
    Investigate,
    Protect,
    Attack,
}

/// One submitted night action. At most one per (actor, night); consumed and
/// discarded once dawn resolution applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightAction {
    pub actor: ParticipantId,
    pub kind: NightActionKind,
    pub target: ParticipantId,
    /// Night number (equals the day counter the night belongs to).
    pub night: u8,
}

/// One ballot cast during the day vote. At most one per (voter, ballot);
/// retained for tally display until the vote phase exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vote {
    pub voter: ParticipantId,
    pub target: ParticipantId,
    /// 0 for the first ballot of the day, 1 for the revote.
    pub ballot: u8,
}

/// How a participant left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationCause {
    Vote,
    Attack,
}
