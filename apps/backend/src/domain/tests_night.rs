use crate::domain::actions::{NightAction, NightActionKind};
use crate::domain::night::{all_actions_in, resolve};
use crate::domain::roles::Faction;
use crate::domain::state::Phase;
use crate::domain::test_state_helpers::{five_seat_roles, make_session, MakeSessionArgs};

fn night_session() -> crate::domain::state::SessionState {
    make_session(
        &five_seat_roles(),
        MakeSessionArgs {
            phase: Phase::Night,
            ..Default::default()
        },
    )
}

fn act(
    state: &mut crate::domain::state::SessionState,
    actor: u8,
    kind: NightActionKind,
    target: u8,
) {
    let night = state.day;
    state.night.actions.push(NightAction {
        actor,
        kind,
        target,
        night,
    });
}

#[test]
fn protected_target_survives_the_attack() {
    let mut state = night_session();
    act(&mut state, 2, NightActionKind::Protect, 3);
    act(&mut state, 0, NightActionKind::Attack, 3);

    let outcome = resolve(&state);
    assert!(outcome.protected.contains(&3));
    assert!(outcome.killed.is_empty());
}

#[test]
fn unprotected_target_is_eliminated() {
    let mut state = night_session();
    act(&mut state, 2, NightActionKind::Protect, 4);
    act(&mut state, 0, NightActionKind::Attack, 3);

    let outcome = resolve(&state);
    assert_eq!(outcome.killed, vec![3]);
}

#[test]
fn investigation_reports_true_faction_regardless_of_protection_and_attack() {
    let mut state = night_session();
    act(&mut state, 2, NightActionKind::Protect, 0);
    act(&mut state, 1, NightActionKind::Investigate, 0);
    act(&mut state, 0, NightActionKind::Attack, 1);

    let outcome = resolve(&state);
    assert_eq!(outcome.investigations.len(), 1);
    let investigation = outcome.investigations[0];
    assert_eq!(investigation.seer, 1);
    assert_eq!(investigation.target, 0);
    assert_eq!(investigation.faction, Faction::Werewolves);
    // The attacked seer still gets the result this night; death applies at dawn.
    assert_eq!(outcome.killed, vec![1]);
}

#[test]
fn simultaneous_attacks_on_one_target_collapse() {
    let mut state = night_session();
    // Two wolves is not the standard five-seat setup, but resolution must
    // not care where the actions came from.
    act(&mut state, 0, NightActionKind::Attack, 3);
    act(&mut state, 4, NightActionKind::Attack, 3);

    let outcome = resolve(&state);
    assert_eq!(outcome.killed, vec![3]);
}

#[test]
fn resolution_with_no_actions_is_a_no_op() {
    let state = night_session();
    let outcome = resolve(&state);
    assert!(outcome.protected.is_empty());
    assert!(outcome.investigations.is_empty());
    assert!(outcome.killed.is_empty());
}

#[test]
fn night_completes_once_acting_roles_submitted_or_were_forced() {
    let mut state = night_session();
    assert!(!all_actions_in(&state));

    act(&mut state, 0, NightActionKind::Attack, 3);
    act(&mut state, 1, NightActionKind::Investigate, 0);
    assert!(!all_actions_in(&state));

    // Bodyguard never responded; a force-advance records the no-op.
    state.night.forced.insert(2);
    assert!(all_actions_in(&state));
}

#[test]
fn villagers_are_never_waited_on() {
    let mut state = night_session();
    act(&mut state, 0, NightActionKind::Attack, 3);
    act(&mut state, 1, NightActionKind::Investigate, 0);
    act(&mut state, 2, NightActionKind::Protect, 3);
    // Seats 3 and 4 are villagers with no night action.
    assert!(all_actions_in(&state));
}
