use crate::domain::sequencer::{advance, first_speaker, Advance};
use crate::domain::test_state_helpers::{five_seat_roles, make_session, MakeSessionArgs};

const MAX_ROUNDS: u8 = 3;

fn discussion_session() -> crate::domain::state::SessionState {
    make_session(&five_seat_roles(), MakeSessionArgs::default())
}

#[test]
fn advance_moves_to_the_next_living_speaker() {
    let mut state = discussion_session();
    assert_eq!(first_speaker(&mut state, MAX_ROUNDS), Advance::Speaker(0));
    assert_eq!(advance(&mut state, MAX_ROUNDS), Advance::Speaker(1));
    assert_eq!(advance(&mut state, MAX_ROUNDS), Advance::Speaker(2));
}

#[test]
fn dead_speakers_are_skipped() {
    let mut state = discussion_session();
    for id in [1, 2] {
        if let Some(p) = state.participant_mut(id) {
            p.alive = false;
        }
    }
    assert_eq!(first_speaker(&mut state, MAX_ROUNDS), Advance::Speaker(0));
    assert_eq!(advance(&mut state, MAX_ROUNDS), Advance::Speaker(3));
}

#[test]
fn wrapping_the_order_increments_the_round() {
    let mut state = discussion_session();
    first_speaker(&mut state, MAX_ROUNDS);
    for _ in 0..4 {
        advance(&mut state, MAX_ROUNDS);
    }
    assert_eq!(state.round, 1);
    assert_eq!(advance(&mut state, MAX_ROUNDS), Advance::Speaker(0));
    assert_eq!(state.round, 2);
}

#[test]
fn crossing_the_round_bound_exhausts_the_phase() {
    let mut state = discussion_session();
    state.round = MAX_ROUNDS;
    state.turn_index = state.turn_order.len() - 1;
    assert_eq!(advance(&mut state, MAX_ROUNDS), Advance::Exhausted);
    assert!(state.round > MAX_ROUNDS);
}

#[test]
fn single_living_speaker_converges_within_one_lap() {
    let mut state = discussion_session();
    for id in [0, 1, 2, 4] {
        if let Some(p) = state.participant_mut(id) {
            p.alive = false;
        }
    }
    // Generous bound so the lap limit is what terminates each call.
    for _ in 0..10 {
        match advance(&mut state, u8::MAX) {
            Advance::Speaker(id) => assert_eq!(id, 3),
            Advance::Exhausted => panic!("a living speaker exists"),
        }
    }
}

#[test]
fn all_dead_never_spins_more_than_one_lap() {
    let mut state = discussion_session();
    for p in &mut state.participants {
        p.alive = false;
    }
    assert_eq!(advance(&mut state, u8::MAX), Advance::Exhausted);
}

#[test]
fn empty_order_is_exhausted_immediately() {
    let mut state = discussion_session();
    state.turn_order.clear();
    assert_eq!(advance(&mut state, MAX_ROUNDS), Advance::Exhausted);
    assert_eq!(first_speaker(&mut state, MAX_ROUNDS), Advance::Exhausted);
}
