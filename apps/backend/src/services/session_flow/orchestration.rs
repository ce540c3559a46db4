use tracing::info;

use crate::config::session::SessionConfig;
use crate::domain::actions::EliminationCause;
use crate::domain::events::{EventKind, SessionEvent};
use crate::domain::roles::Faction;
use crate::domain::sequencer::{self, Advance};
use crate::domain::state::{
    win_check, NightState, ParticipantId, Phase, SessionState, VoteState,
};
use crate::domain::vote::VoteOutcome;
use crate::domain::{night, vote};
use crate::errors::domain::{DomainError, InfraErrorKind};

/// Run transitions until the session settles.
///
/// Loop-based rather than recursive: one transition can immediately enable
/// the next (a vote resolution into a win, a dawn resolution straight into
/// a finished session), so iterate until quiescent with a hard bound.
pub(super) fn process_session_state(
    state: &mut SessionState,
    events: &mut Vec<SessionEvent>,
    config: &SessionConfig,
) -> Result<(), DomainError> {
    // A single call can cross at most a handful of phase edges; the bound
    // only exists to turn a transition bug into an error instead of a hang.
    const MAX_ITERATIONS: usize = 32;

    for _ in 0..MAX_ITERATIONS {
        if state.phase == Phase::Finished {
            return Ok(());
        }
        if !check_and_apply_transition(state, events, config) {
            return Ok(());
        }
    }

    Err(DomainError::infra(
        InfraErrorKind::Other("TRANSITION_LOOP".into()),
        format!("process_session_state exceeded max iterations {MAX_ITERATIONS}"),
    ))
}

/// Check whether the current phase is ready to exit and apply the edge.
/// Returns true if a transition was applied.
fn check_and_apply_transition(
    state: &mut SessionState,
    events: &mut Vec<SessionEvent>,
    config: &SessionConfig,
) -> bool {
    match state.phase {
        Phase::DayDiscussion => {
            let exhausted = state.round > config.discussion_rounds
                || state.turn_order.is_empty()
                || state.living().next().is_none();
            if exhausted {
                enter_day_vote(state, events);
                return true;
            }
            false
        }
        Phase::DayVote => {
            if !vote::all_ballots_in(state) {
                return false;
            }
            match vote::resolve(state) {
                VoteOutcome::Revote => {
                    info!(room_id = state.room_id, day = state.day, "Vote tied, starting revote");
                    // Re-entered without advancing the day or round counters.
                    state.vote.votes.clear();
                    state.vote.abstained.clear();
                    state.vote.revote = true;
                    state.push_event(events, EventKind::RevoteStarted { day: state.day });
                    true
                }
                VoteOutcome::NoElimination => {
                    let day = state.day;
                    state.push_event(
                        events,
                        EventKind::VoteResolved {
                            eliminated: None,
                            day,
                        },
                    );
                    enter_night(state, events);
                    true
                }
                VoteOutcome::Eliminated(target) => {
                    let day = state.day;
                    eliminate(state, events, target, EliminationCause::Vote);
                    state.push_event(
                        events,
                        EventKind::VoteResolved {
                            eliminated: Some(target),
                            day,
                        },
                    );
                    match win_check(&state.participants) {
                        Some(winner) => finish(state, events, winner),
                        None => enter_night(state, events),
                    }
                    true
                }
            }
        }
        Phase::Night => {
            if !night::all_actions_in(state) {
                return false;
            }
            let outcome = night::resolve(state);
            info!(
                room_id = state.room_id,
                night = state.day,
                killed = outcome.killed.len(),
                "Resolving night"
            );
            state.investigations.extend(outcome.investigations.iter().copied());
            for target in &outcome.killed {
                eliminate(state, events, *target, EliminationCause::Attack);
            }
            // Pending actions are consumed and discarded at dawn.
            state.night = NightState::default();
            match win_check(&state.participants) {
                Some(winner) => finish(state, events, winner),
                None => enter_day_discussion(state, events, config),
            }
            true
        }
        Phase::Waiting | Phase::Finished => false,
    }
}

fn eliminate(
    state: &mut SessionState,
    events: &mut Vec<SessionEvent>,
    target: ParticipantId,
    cause: EliminationCause,
) {
    let day = state.day;
    let role = match state.participant_mut(target) {
        Some(p) if p.alive => {
            p.alive = false;
            p.role
        }
        _ => return,
    };
    info!(
        room_id = state.room_id,
        participant = target,
        cause = ?cause,
        "Participant eliminated"
    );
    state.push_event(
        events,
        EventKind::Eliminated {
            participant: target,
            role,
            cause,
            day,
        },
    );
}

fn enter_day_vote(state: &mut SessionState, events: &mut Vec<SessionEvent>) {
    state.phase = Phase::DayVote;
    state.vote = VoteState::default();
    state.push_event(
        events,
        EventKind::PhaseChanged {
            phase: Phase::DayVote,
            day: state.day,
            round: state.round,
        },
    );
}

fn enter_night(state: &mut SessionState, events: &mut Vec<SessionEvent>) {
    state.phase = Phase::Night;
    // The tally is cleared whenever the vote phase exits.
    state.vote = VoteState::default();
    state.night = NightState::default();
    state.push_event(
        events,
        EventKind::PhaseChanged {
            phase: Phase::Night,
            day: state.day,
            round: state.round,
        },
    );
}

fn enter_day_discussion(
    state: &mut SessionState,
    events: &mut Vec<SessionEvent>,
    config: &SessionConfig,
) {
    state.day += 1;
    state.round = 1;
    state.phase = Phase::DayDiscussion;
    state.push_event(
        events,
        EventKind::PhaseChanged {
            phase: Phase::DayDiscussion,
            day: state.day,
            round: 1,
        },
    );
    if let Advance::Speaker(speaker) = sequencer::first_speaker(state, config.discussion_rounds) {
        state.push_event(
            events,
            EventKind::SpeakerChanged {
                speaker,
                round: state.round,
            },
        );
    }
}

fn finish(state: &mut SessionState, events: &mut Vec<SessionEvent>, winner: Faction) {
    state.winner = Some(winner);
    state.phase = Phase::Finished;
    state.vote = VoteState::default();
    state.night = NightState::default();
    state.push_event(events, EventKind::WinRecorded { faction: winner });
    state.push_event(
        events,
        EventKind::PhaseChanged {
            phase: Phase::Finished,
            day: state.day,
            round: state.round,
        },
    );
    info!(room_id = state.room_id, winner = ?winner, "Session finished");
}
