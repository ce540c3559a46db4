//! Dawn resolution of the night's submitted actions.

use std::collections::BTreeSet;

use crate::domain::actions::NightActionKind;
use crate::domain::state::{Investigation, ParticipantId, SessionState};
use crate::domain::validator::has_night_action;

/// Result of combining one night's actions, applied atomically at dawn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightOutcome {
    pub protected: BTreeSet<ParticipantId>,
    pub investigations: Vec<Investigation>,
    /// Deduplicated eliminations; protected targets already removed.
    pub killed: Vec<ParticipantId>,
}

/// True once every living participant of an acting role has submitted or
/// been force-advanced. Missing actions are no-ops for that role, never a
/// blocking condition.
pub fn all_actions_in(state: &SessionState) -> bool {
    state
        .living()
        .filter(|p| p.role.night_action().is_some())
        .all(|p| has_night_action(state, p.id))
}

/// Resolution order matters: protections build the protected set first,
/// investigations report the target's true faction (independent of any
/// protection or attack), and attacks apply last.
pub fn resolve(state: &SessionState) -> NightOutcome {
    let mut outcome = NightOutcome::default();

    for action in &state.night.actions {
        if action.kind == NightActionKind::Protect {
            outcome.protected.insert(action.target);
        }
    }

    for action in &state.night.actions {
        if action.kind == NightActionKind::Investigate {
            if let Some(target) = state.participant(action.target) {
                outcome.investigations.push(Investigation {
                    seer: action.actor,
                    target: action.target,
                    faction: target.role.faction(),
                    night: action.night,
                });
            }
        }
    }

    // Multiple attacks on one target collapse to a single elimination.
    let mut killed = BTreeSet::new();
    for action in &state.night.actions {
        if action.kind == NightActionKind::Attack && !outcome.protected.contains(&action.target) {
            killed.insert(action.target);
        }
    }
    outcome.killed = killed.into_iter().collect();
    outcome
}
