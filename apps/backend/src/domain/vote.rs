//! Day-vote tallying and resolution.

use std::collections::BTreeMap;

use crate::domain::state::{ParticipantId, SessionState};
use crate::domain::validator::has_ballot;

/// Final outcome of resolving a ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    Eliminated(ParticipantId),
    /// First tie of the day: the tally is cleared and the vote phase
    /// re-enters without advancing the day or round counters.
    Revote,
    /// Second consecutive tie, or a ballot with no votes at all.
    NoElimination,
}

/// True once every living participant has voted or been force-advanced.
pub fn all_ballots_in(state: &SessionState) -> bool {
    state.living().all(|p| has_ballot(state, p.id))
}

/// Resolve the current tally. Counts are keyed by target id, so the result
/// never depends on submission order.
pub fn resolve(state: &SessionState) -> VoteOutcome {
    let mut counts: BTreeMap<ParticipantId, usize> = BTreeMap::new();
    for vote in &state.vote.votes {
        *counts.entry(vote.target).or_insert(0) += 1;
    }

    let mut best: Option<(ParticipantId, usize)> = None;
    let mut tied = false;
    for (&target, &count) in &counts {
        match best {
            None => best = Some((target, count)),
            Some((_, top)) if count > top => {
                best = Some((target, count));
                tied = false;
            }
            Some((_, top)) if count == top => tied = true,
            Some(_) => {}
        }
    }

    match best {
        None => VoteOutcome::NoElimination,
        Some(_) if tied => {
            if state.vote.revote {
                VoteOutcome::NoElimination
            } else {
                VoteOutcome::Revote
            }
        }
        Some((target, _)) => VoteOutcome::Eliminated(target),
    }
}
