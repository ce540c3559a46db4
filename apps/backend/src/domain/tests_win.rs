use crate::domain::roles::Faction;
use crate::domain::state::win_check;
use crate::domain::test_state_helpers::{five_seat_roles, make_session, MakeSessionArgs};

#[test]
fn no_living_werewolves_means_villagers_win() {
    let mut state = make_session(&five_seat_roles(), MakeSessionArgs::default());
    if let Some(p) = state.participant_mut(0) {
        p.alive = false;
    }
    assert_eq!(win_check(&state.participants), Some(Faction::Villagers));
}

#[test]
fn werewolf_parity_means_werewolves_win() {
    let mut state = make_session(&five_seat_roles(), MakeSessionArgs::default());
    // One wolf, one villager left: 1 >= 1.
    for id in [1, 2, 3] {
        if let Some(p) = state.participant_mut(id) {
            p.alive = false;
        }
    }
    assert_eq!(win_check(&state.participants), Some(Faction::Werewolves));
}

#[test]
fn ongoing_session_has_no_winner() {
    let state = make_session(&five_seat_roles(), MakeSessionArgs::default());
    assert_eq!(win_check(&state.participants), None);
}

#[test]
fn win_check_is_idempotent() {
    let mut state = make_session(&five_seat_roles(), MakeSessionArgs::default());
    if let Some(p) = state.participant_mut(0) {
        p.alive = false;
    }
    let first = win_check(&state.participants);
    assert_eq!(win_check(&state.participants), first);
}

#[test]
fn everyone_dead_resolves_to_the_first_condition() {
    let mut state = make_session(&five_seat_roles(), MakeSessionArgs::default());
    for p in &mut state.participants {
        p.alive = false;
    }
    // Zero living wolves is checked first, so villagers take it.
    assert_eq!(win_check(&state.participants), Some(Faction::Villagers));
}
