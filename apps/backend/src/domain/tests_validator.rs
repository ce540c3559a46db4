use crate::domain::actions::{NightAction, NightActionKind, Vote};
use crate::domain::state::Phase;
use crate::domain::test_state_helpers::{five_seat_roles, make_session, MakeSessionArgs};
use crate::domain::validator::{validate_night_action, validate_speech, validate_vote};
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};

fn session(phase: Phase) -> crate::domain::state::SessionState {
    make_session(
        &five_seat_roles(),
        MakeSessionArgs {
            phase,
            ..Default::default()
        },
    )
}

fn kind_of(err: DomainError) -> ValidationKind {
    match err {
        DomainError::Validation(kind, _) => kind,
        other => panic!("expected validation error, got {other}"),
    }
}

#[test]
fn speech_outside_discussion_is_invalid_phase() {
    let state = session(Phase::Night);
    let err = validate_speech(&state, 0).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::InvalidPhase);
}

#[test]
fn speech_out_of_turn_is_not_authorized() {
    let state = session(Phase::DayDiscussion);
    // Turn pointer sits on seat 0.
    let err = validate_speech(&state, 3).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::NotAuthorized);
}

#[test]
fn dead_actor_is_not_authorized() {
    let mut state = session(Phase::DayVote);
    if let Some(p) = state.participant_mut(3) {
        p.alive = false;
    }
    let err = validate_vote(&state, 3, 0).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::NotAuthorized);
}

#[test]
fn second_vote_in_a_round_is_a_duplicate() {
    let mut state = session(Phase::DayVote);
    state.vote.votes.push(Vote {
        voter: 1,
        target: 0,
        ballot: 0,
    });
    let err = validate_vote(&state, 1, 4).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::DuplicateAction);
}

#[test]
fn forced_abstention_counts_as_having_voted() {
    let mut state = session(Phase::DayVote);
    state.vote.abstained.insert(1);
    let err = validate_vote(&state, 1, 0).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::DuplicateAction);
}

#[test]
fn voting_for_a_dead_target_is_illegal() {
    let mut state = session(Phase::DayVote);
    if let Some(p) = state.participant_mut(4) {
        p.alive = false;
    }
    let err = validate_vote(&state, 1, 4).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::IllegalTarget);
}

#[test]
fn voting_for_a_nonexistent_target_is_not_found() {
    let state = session(Phase::DayVote);
    let err = validate_vote(&state, 1, 42).unwrap_err();
    assert!(matches!(
        err,
        DomainError::NotFound(NotFoundKind::Participant, _)
    ));
}

#[test]
fn night_action_outside_night_is_invalid_phase() {
    let state = session(Phase::DayDiscussion);
    let err = validate_night_action(&state, 0, NightActionKind::Attack, 3).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::InvalidPhase);
}

#[test]
fn wrong_role_for_the_action_is_not_authorized() {
    let state = session(Phase::Night);
    // Seat 3 is a villager.
    let err = validate_night_action(&state, 3, NightActionKind::Attack, 0).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::NotAuthorized);

    // The seer cannot protect either.
    let err = validate_night_action(&state, 1, NightActionKind::Protect, 0).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::NotAuthorized);
}

#[test]
fn second_night_action_is_a_duplicate() {
    let mut state = session(Phase::Night);
    state.night.actions.push(NightAction {
        actor: 0,
        kind: NightActionKind::Attack,
        target: 3,
        night: 1,
    });
    let err = validate_night_action(&state, 0, NightActionKind::Attack, 4).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::DuplicateAction);
}

#[test]
fn protect_and_attack_cannot_self_target() {
    let state = session(Phase::Night);
    let err = validate_night_action(&state, 2, NightActionKind::Protect, 2).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::IllegalTarget);

    let err = validate_night_action(&state, 0, NightActionKind::Attack, 0).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::IllegalTarget);
}

#[test]
fn investigate_may_self_target_but_not_a_dead_target() {
    let mut state = session(Phase::Night);
    assert!(validate_night_action(&state, 1, NightActionKind::Investigate, 1).is_ok());

    if let Some(p) = state.participant_mut(3) {
        p.alive = false;
    }
    let err = validate_night_action(&state, 1, NightActionKind::Investigate, 3).unwrap_err();
    assert_eq!(kind_of(err), ValidationKind::IllegalTarget);
}
