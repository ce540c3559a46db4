use crate::domain::actions::Vote;
use crate::domain::state::Phase;
use crate::domain::test_state_helpers::{five_seat_roles, make_session, MakeSessionArgs};
use crate::domain::vote::{all_ballots_in, resolve, VoteOutcome};

fn vote_phase_session() -> crate::domain::state::SessionState {
    make_session(
        &five_seat_roles(),
        MakeSessionArgs {
            phase: Phase::DayVote,
            ..Default::default()
        },
    )
}

fn cast(state: &mut crate::domain::state::SessionState, voter: u8, target: u8) {
    let ballot = state.ballot();
    state.vote.votes.push(Vote {
        voter,
        target,
        ballot,
    });
}

#[test]
fn unique_maximum_eliminates_the_leader() {
    let mut state = vote_phase_session();
    cast(&mut state, 1, 0);
    cast(&mut state, 2, 0);
    cast(&mut state, 3, 0);
    cast(&mut state, 4, 3);
    cast(&mut state, 0, 3);
    assert_eq!(resolve(&state), VoteOutcome::Eliminated(0));
}

#[test]
fn two_way_tie_triggers_revote() {
    // {A: 2, B: 2, C: 1} must resolve to a revote.
    let mut state = vote_phase_session();
    cast(&mut state, 0, 1);
    cast(&mut state, 2, 1);
    cast(&mut state, 1, 0);
    cast(&mut state, 3, 0);
    cast(&mut state, 4, 2);
    assert_eq!(resolve(&state), VoteOutcome::Revote);
}

#[test]
fn second_consecutive_tie_resolves_to_no_elimination() {
    let mut state = vote_phase_session();
    state.vote.revote = true; // first tie already happened
    cast(&mut state, 0, 1);
    cast(&mut state, 1, 0);
    assert_eq!(resolve(&state), VoteOutcome::NoElimination);
}

#[test]
fn tie_detection_is_independent_of_submission_order() {
    let mut forward = vote_phase_session();
    cast(&mut forward, 0, 1);
    cast(&mut forward, 1, 0);
    cast(&mut forward, 2, 0);
    cast(&mut forward, 3, 1);

    let mut reverse = vote_phase_session();
    cast(&mut reverse, 3, 1);
    cast(&mut reverse, 2, 0);
    cast(&mut reverse, 1, 0);
    cast(&mut reverse, 0, 1);

    assert_eq!(resolve(&forward), resolve(&reverse));
}

#[test]
fn no_votes_at_all_resolves_to_no_elimination() {
    let state = vote_phase_session();
    assert_eq!(resolve(&state), VoteOutcome::NoElimination);
}

#[test]
fn ballots_complete_once_everyone_voted_or_abstained() {
    let mut state = vote_phase_session();
    assert!(!all_ballots_in(&state));

    for voter in 0..4 {
        cast(&mut state, voter, 4);
    }
    assert!(!all_ballots_in(&state));

    // The last voter was force-advanced to an abstention.
    state.vote.abstained.insert(4);
    assert!(all_ballots_in(&state));
}

#[test]
fn dead_participants_do_not_block_the_ballot() {
    let mut state = vote_phase_session();
    if let Some(p) = state.participant_mut(4) {
        p.alive = false;
    }
    for voter in 0..4 {
        cast(&mut state, voter, 0);
    }
    assert!(all_ballots_in(&state));
}
