use serde::{Deserialize, Serialize};

use crate::domain::actions::NightActionKind;
use crate::domain::state::ParticipantId;

/// Win-condition alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Villagers,
    Werewolves,
}

/// Role assigned at session start. Never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Villager,
    Seer,
    Bodyguard,
    Werewolf,
}

impl Role {
    pub fn faction(self) -> Faction {
        match self {
            Role::Werewolf => Faction::Werewolves,
            Role::Villager | Role::Seer | Role::Bodyguard => Faction::Villagers,
        }
    }

    /// Night action this role is expected to submit, if any.
    pub fn night_action(self) -> Option<NightActionKind> {
        match self {
            Role::Seer => Some(NightActionKind::Investigate),
            Role::Bodyguard => Some(NightActionKind::Protect),
            Role::Werewolf => Some(NightActionKind::Attack),
            Role::Villager => None,
        }
    }
}

/// Roster member. Created at session start; the alive flag flips on
/// elimination, but the entry is never removed (history stays inspectable).
#[derive(Debug, Clone)]
pub struct Participant {
    /// Roster index; participants are stored in id order.
    pub id: ParticipantId,
    pub name: String,
    pub is_human: bool,
    pub alive: bool,
    pub role: Role,
    /// Opaque persona blob for the AI driver; the core never inspects it.
    pub persona: Option<String>,
}
