//! Pure rule checks for participant actions. No I/O; a rejection never
//! mutates session state.

use crate::domain::actions::NightActionKind;
use crate::domain::roles::Participant;
use crate::domain::state::{ParticipantId, Phase, SessionState};
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};

/// Checks run in order: actor exists and is alive, phase matches the action
/// kind, the actor is allowed to act now, the actor has not already acted,
/// the target is legal.
pub fn validate_speech(state: &SessionState, actor: ParticipantId) -> Result<(), DomainError> {
    require_living(state, actor)?;
    if state.phase != Phase::DayDiscussion {
        return Err(DomainError::validation(
            ValidationKind::InvalidPhase,
            "speech is only accepted during day discussion",
        ));
    }
    if state.current_speaker() != Some(actor) {
        return Err(DomainError::validation(
            ValidationKind::NotAuthorized,
            format!("it is not participant {actor}'s turn to speak"),
        ));
    }
    Ok(())
}

pub fn validate_vote(
    state: &SessionState,
    voter: ParticipantId,
    target: ParticipantId,
) -> Result<(), DomainError> {
    require_living(state, voter)?;
    if state.phase != Phase::DayVote {
        return Err(DomainError::validation(
            ValidationKind::InvalidPhase,
            "votes are only accepted during the day vote",
        ));
    }
    if has_ballot(state, voter) {
        return Err(DomainError::validation(
            ValidationKind::DuplicateAction,
            "already voted this round",
        ));
    }
    let target_participant = require_participant(state, target)?;
    if !target_participant.alive {
        return Err(DomainError::validation(
            ValidationKind::IllegalTarget,
            "cannot vote for a dead participant",
        ));
    }
    Ok(())
}

pub fn validate_night_action(
    state: &SessionState,
    actor: ParticipantId,
    kind: NightActionKind,
    target: ParticipantId,
) -> Result<(), DomainError> {
    let acting = require_living(state, actor)?;
    let role = acting.role;
    if state.phase != Phase::Night {
        return Err(DomainError::validation(
            ValidationKind::InvalidPhase,
            "night actions are only accepted during the night",
        ));
    }
    if role.night_action() != Some(kind) {
        return Err(DomainError::validation(
            ValidationKind::NotAuthorized,
            format!("role {role:?} cannot {kind:?}"),
        ));
    }
    if has_night_action(state, actor) {
        return Err(DomainError::validation(
            ValidationKind::DuplicateAction,
            "already acted tonight",
        ));
    }
    let target_participant = require_participant(state, target)?;
    if !target_participant.alive {
        return Err(DomainError::validation(
            ValidationKind::IllegalTarget,
            "cannot target a dead participant",
        ));
    }
    // Investigate is the only self-targetable night action.
    if target == actor && kind != NightActionKind::Investigate {
        return Err(DomainError::validation(
            ValidationKind::IllegalTarget,
            "cannot target yourself",
        ));
    }
    Ok(())
}

/// Voter already has a ballot in (cast or forced abstention).
pub fn has_ballot(state: &SessionState, id: ParticipantId) -> bool {
    state.vote.votes.iter().any(|v| v.voter == id) || state.vote.abstained.contains(&id)
}

/// Actor already acted tonight (submitted or forced no-op).
pub fn has_night_action(state: &SessionState, id: ParticipantId) -> bool {
    state.night.actions.iter().any(|a| a.actor == id) || state.night.forced.contains(&id)
}

fn require_participant(
    state: &SessionState,
    id: ParticipantId,
) -> Result<&Participant, DomainError> {
    state.participant(id).ok_or_else(|| {
        DomainError::not_found(
            NotFoundKind::Participant,
            format!("participant {id} is not in the roster"),
        )
    })
}

fn require_living(state: &SessionState, id: ParticipantId) -> Result<&Participant, DomainError> {
    let participant = require_participant(state, id)?;
    if !participant.alive {
        return Err(DomainError::validation(
            ValidationKind::NotAuthorized,
            format!("participant {id} has been eliminated"),
        ));
    }
    Ok(participant)
}
