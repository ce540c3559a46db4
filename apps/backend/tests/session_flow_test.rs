// End-to-end orchestration tests driven through the public service
// operations, no HTTP in between.

mod support;

use backend::domain::{Faction, NightActionKind, Phase, Role};
use backend::errors::ErrorCode;
use backend::AppError;

use crate::support::build_test_state;

const ROOM: i64 = 7;

#[tokio::test]
async fn protected_attacks_fizzle_and_the_day_vote_ends_the_session(
) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state();
    let flow = state.flow();

    // waiting -> day_discussion with the roster order as turn order.
    let snap = flow.start_session(ROOM).await?;
    assert_eq!(snap.phase, Phase::DayDiscussion);
    assert_eq!(snap.day, 1);
    assert_eq!(snap.round, 1);
    assert_eq!(snap.turn_order, vec![0, 1, 2, 3, 4]);
    assert_eq!(snap.current_speaker, Some(0));

    // The current speaker talks; the pointer moves on.
    let snap = flow.submit_speech(ROOM, 0, "I saw nothing last night".to_string())?;
    assert_eq!(snap.current_speaker, Some(1));

    // Speaking out of turn is rejected without touching state.
    let version_before = snap.version;
    let err = flow
        .submit_speech(ROOM, 3, "me first".to_string())
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::NotAuthorized);
    assert_eq!(flow.get_state(ROOM)?.version, version_before);

    // Moderator trigger ends the discussion early.
    let snap = flow.call_vote(ROOM)?;
    assert_eq!(snap.phase, Phase::DayVote);
    assert_eq!(snap.day, 1);

    // First ballot: {0: 2, 1: 2, 3: 1} is a tie and triggers the revote.
    flow.submit_vote(ROOM, 1, 0)?;

    // A second ballot from the same voter is a duplicate, no state change.
    let version_before = flow.get_state(ROOM)?.version;
    let err = flow.submit_vote(ROOM, 1, 3).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicateAction);
    assert_eq!(flow.get_state(ROOM)?.version, version_before);

    flow.submit_vote(ROOM, 2, 0)?;
    flow.submit_vote(ROOM, 3, 1)?;
    flow.submit_vote(ROOM, 4, 1)?;
    let snap = flow.submit_vote(ROOM, 0, 3)?;
    assert_eq!(snap.phase, Phase::DayVote);
    assert!(snap.revote);
    assert_eq!(snap.day, 1, "revote must not advance the day");
    assert!(snap.votes.is_empty(), "tally cleared for the revote");

    // Second consecutive tie resolves to no elimination and night begins.
    flow.submit_vote(ROOM, 1, 0)?;
    flow.submit_vote(ROOM, 2, 0)?;
    flow.submit_vote(ROOM, 3, 1)?;
    flow.submit_vote(ROOM, 4, 1)?;
    let snap = flow.submit_vote(ROOM, 0, 3)?;
    assert_eq!(snap.phase, Phase::Night);
    assert_eq!(snap.day, 1);
    assert!(snap.participants.iter().all(|p| p.alive));

    // Night 1: the wolf attacks the protected villager; the seer looks at
    // the wolf. Submission order must not matter for resolution.
    flow.submit_night_action(ROOM, 0, NightActionKind::Attack, 3)?;
    flow.submit_night_action(ROOM, 1, NightActionKind::Investigate, 0)?;
    let snap = flow.submit_night_action(ROOM, 2, NightActionKind::Protect, 3)?;
    assert_eq!(snap.phase, Phase::DayDiscussion);
    assert_eq!(snap.day, 2);
    assert_eq!(snap.current_speaker, Some(0));
    assert!(snap.participants.iter().all(|p| p.alive), "protect nullified the attack");

    // The investigation result is private to the seer.
    let (_, seer_view) = flow.get_state_for(ROOM, 1)?;
    assert_eq!(seer_view.role, Some(Role::Seer));
    assert_eq!(seer_view.investigations.len(), 1);
    assert_eq!(seer_view.investigations[0].target, 0);
    assert_eq!(seer_view.investigations[0].faction, Faction::Werewolves);
    assert_eq!(seer_view.investigations[0].night, 1);

    // Nobody else sees a role while its holder lives.
    let snap = flow.get_state(ROOM)?;
    assert!(snap.participants.iter().all(|p| p.role.is_none()));

    // Day 2: everyone stalls; forced abstentions resolve to no elimination.
    flow.call_vote(ROOM)?;
    let mut snap = flow.get_state(ROOM)?;
    for _ in 0..5 {
        snap = flow.force_advance(ROOM)?;
    }
    assert_eq!(snap.phase, Phase::Night);
    assert_eq!(snap.day, 2);

    // Night 2: same protected attack, same fizzle.
    flow.submit_night_action(ROOM, 2, NightActionKind::Protect, 3)?;
    flow.submit_night_action(ROOM, 0, NightActionKind::Attack, 3)?;
    let snap = flow.submit_night_action(ROOM, 1, NightActionKind::Investigate, 2)?;
    assert_eq!(snap.phase, Phase::DayDiscussion);
    assert_eq!(snap.day, 3);
    assert!(snap.participants.iter().all(|p| p.alive));

    // Day 3: the village votes the wolf out; villagers win.
    flow.call_vote(ROOM)?;
    flow.submit_vote(ROOM, 1, 0)?;
    flow.submit_vote(ROOM, 2, 0)?;
    flow.submit_vote(ROOM, 3, 0)?;
    flow.submit_vote(ROOM, 4, 0)?;
    let snap = flow.submit_vote(ROOM, 0, 3)?;
    assert_eq!(snap.phase, Phase::Finished);
    assert_eq!(snap.winner, Some(Faction::Villagers));

    let wolf = &snap.participants[0];
    assert!(!wolf.alive);
    assert_eq!(wolf.role, Some(Role::Werewolf));
    // Roles are revealed to everyone once the session is over.
    assert!(snap.participants.iter().all(|p| p.role.is_some()));

    // Force-advancing a finished session is a no-op.
    let version = snap.version;
    let snap = flow.force_advance(ROOM)?;
    assert_eq!(snap.version, version);

    Ok(())
}

#[tokio::test]
async fn unprotected_attack_eliminates_and_parity_ends_the_session(
) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state();
    let flow = state.flow();
    flow.start_session(ROOM).await?;

    // Day 1: pile the votes on villager_b.
    flow.call_vote(ROOM)?;
    flow.submit_vote(ROOM, 0, 4)?;
    flow.submit_vote(ROOM, 1, 4)?;
    flow.submit_vote(ROOM, 2, 4)?;
    flow.submit_vote(ROOM, 3, 4)?;
    let snap = flow.submit_vote(ROOM, 4, 0)?;
    assert_eq!(snap.phase, Phase::Night);
    assert!(!snap.participants[4].alive);
    assert_eq!(snap.participants[4].role, Some(Role::Villager));

    // Night 1: the guard protects the wrong villager.
    flow.submit_night_action(ROOM, 2, NightActionKind::Protect, 1)?;
    flow.submit_night_action(ROOM, 1, NightActionKind::Investigate, 3)?;
    let snap = flow.submit_night_action(ROOM, 0, NightActionKind::Attack, 3)?;
    assert_eq!(snap.phase, Phase::DayDiscussion);
    assert_eq!(snap.day, 2);
    assert!(!snap.participants[3].alive);

    // Votes for the dead are illegal.
    flow.call_vote(ROOM)?;
    let err = flow.submit_vote(ROOM, 1, 4).unwrap_err();
    assert_eq!(err.code(), ErrorCode::IllegalTarget);
    assert!(matches!(err, AppError::Validation { .. }));

    // Day 2: the living mis-vote a villager out; parity hands it to the wolf.
    flow.submit_vote(ROOM, 0, 1)?;
    flow.submit_vote(ROOM, 2, 1)?;
    let snap = flow.submit_vote(ROOM, 1, 0)?;
    assert_eq!(snap.phase, Phase::Finished);
    assert_eq!(snap.winner, Some(Faction::Werewolves));

    Ok(())
}

#[tokio::test]
async fn force_advance_races_resolve_through_the_duplicate_check(
) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state();
    let flow = state.flow();
    flow.start_session(ROOM).await?;
    flow.call_vote(ROOM)?;

    // The fallback driver forces the longest-waiting voter (seat 0) into an
    // abstention...
    flow.force_advance(ROOM)?;

    // ...so seat 0's late ballot loses the race.
    let err = flow.submit_vote(ROOM, 0, 3).unwrap_err();
    assert_eq!(err.code(), ErrorCode::DuplicateAction);

    // The reverse race: a real ballot beats a later force for that seat.
    flow.submit_vote(ROOM, 1, 0)?;
    // Seat 1 already voted, so this force lands on seat 2 instead.
    flow.force_advance(ROOM)?;
    flow.submit_vote(ROOM, 3, 0)?;

    // Finish the ballot: seat 4 votes, everyone is then in.
    let snap = flow.submit_vote(ROOM, 4, 0)?;
    // {0: 3} with two abstentions: the wolf is eliminated, villagers win.
    assert_eq!(snap.phase, Phase::Finished);
    assert_eq!(snap.winner, Some(Faction::Villagers));

    Ok(())
}

#[tokio::test]
async fn sessions_cannot_start_twice_and_close_tears_down(
) -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state();
    let flow = state.flow();
    flow.start_session(ROOM).await?;

    let err = flow.start_session(ROOM).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::SessionAlreadyStarted);

    flow.close_session(ROOM)?;
    let err = flow.get_state(ROOM).unwrap_err();
    assert_eq!(err.code(), ErrorCode::SessionNotFound);

    // A fresh session can start in the same room afterwards.
    flow.start_session(ROOM).await?;
    Ok(())
}

#[tokio::test]
async fn unknown_rooms_are_not_found() {
    let state = build_test_state();
    let err = state.flow().get_state(999).unwrap_err();
    assert_eq!(err.code(), ErrorCode::SessionNotFound);

    let err = state
        .flow()
        .submit_vote(999, 0, 1)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::SessionNotFound);
}
