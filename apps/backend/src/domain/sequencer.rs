//! Speaking-order bookkeeping for the discussion phase.

use crate::domain::state::{ParticipantId, SessionState};

/// Outcome of moving the turn pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Pointer landed on a living speaker.
    Speaker(ParticipantId),
    /// No further speaker this phase: the round bound was crossed or nobody
    /// in the order is alive. The caller owes a phase transition.
    Exhausted,
}

/// Advance the pointer to the next living speaker, skipping dead
/// participants. Wrapping past the end of the order increments the round
/// counter. Bounded: never more than one full lap without progress.
pub fn advance(state: &mut SessionState, max_rounds: u8) -> Advance {
    let len = state.turn_order.len();
    if len == 0 {
        return Advance::Exhausted;
    }
    for _ in 0..len {
        state.turn_index += 1;
        if state.turn_index >= len {
            state.turn_index = 0;
            state.round += 1;
        }
        if state.round > max_rounds {
            return Advance::Exhausted;
        }
        let id = state.turn_order[state.turn_index];
        if state.is_alive(id) {
            return Advance::Speaker(id);
        }
    }
    Advance::Exhausted
}

/// Seat the pointer on the first living speaker at discussion entry.
pub fn first_speaker(state: &mut SessionState, max_rounds: u8) -> Advance {
    state.turn_index = 0;
    match state.turn_order.first() {
        None => Advance::Exhausted,
        Some(&id) if state.is_alive(id) => Advance::Speaker(id),
        Some(_) => advance(state, max_rounds),
    }
}
