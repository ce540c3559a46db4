use std::sync::Arc;

use tracing::{debug, info};

use super::SessionFlowService;
use crate::domain::actions::{NightAction, NightActionKind, Vote};
use crate::domain::events::EventKind;
use crate::domain::sequencer::{self, Advance};
use crate::domain::snapshot::SessionSnapshot;
use crate::domain::state::{ParticipantId, Phase, RoomId, SessionState};
use crate::domain::validator::{self, has_ballot, has_night_action};
use crate::error::AppError;
use crate::errors::domain::{DomainError, ValidationKind};

impl SessionFlowService {
    /// Record a speech for the current speaker and advance the turn pointer.
    pub fn submit_speech(
        &self,
        room_id: RoomId,
        actor: ParticipantId,
        text: String,
    ) -> Result<Arc<SessionSnapshot>, AppError> {
        debug!(room_id, actor, "Submitting speech");
        let max_rounds = self.config.discussion_rounds;
        let ((), snap) = self.with_room(room_id, |state, events| {
            validator::validate_speech(state, actor)?;
            state.push_event(events, EventKind::Speech { actor, text });
            if let Advance::Speaker(speaker) = sequencer::advance(state, max_rounds) {
                state.push_event(
                    events,
                    EventKind::SpeakerChanged {
                        speaker,
                        round: state.round,
                    },
                );
            }
            Ok(())
        })?;
        Ok(snap)
    }

    /// Cast a ballot. Resolution happens in the transition loop once every
    /// living participant has voted or been force-advanced.
    pub fn submit_vote(
        &self,
        room_id: RoomId,
        voter: ParticipantId,
        target: ParticipantId,
    ) -> Result<Arc<SessionSnapshot>, AppError> {
        debug!(room_id, voter, target, "Submitting vote");
        let ((), snap) = self.with_room(room_id, |state, events| {
            validator::validate_vote(state, voter, target)?;
            let ballot = state.ballot();
            state.vote.votes.push(Vote {
                voter,
                target,
                ballot,
            });
            state.push_event(
                events,
                EventKind::VoteCast {
                    voter,
                    target,
                    ballot,
                },
            );
            Ok(())
        })?;
        Ok(snap)
    }

    /// Submit a role-restricted night action. Dawn resolution happens in the
    /// transition loop once all acting roles have submitted or been forced.
    pub fn submit_night_action(
        &self,
        room_id: RoomId,
        actor: ParticipantId,
        kind: NightActionKind,
        target: ParticipantId,
    ) -> Result<Arc<SessionSnapshot>, AppError> {
        debug!(room_id, actor, target, kind = ?kind, "Submitting night action");
        let ((), snap) = self.with_room(room_id, |state, events| {
            validator::validate_night_action(state, actor, kind, target)?;
            let night = state.day;
            state.night.actions.push(NightAction {
                actor,
                kind,
                target,
                night,
            });
            // Public marker only; the action's kind and target stay private.
            state.push_event(events, EventKind::NightActionSubmitted { actor, night });
            Ok(())
        })?;
        Ok(snap)
    }

    /// Explicit moderator trigger for `day_discussion -> day_vote`.
    pub fn call_vote(&self, room_id: RoomId) -> Result<Arc<SessionSnapshot>, AppError> {
        info!(room_id, "Vote called");
        let max_rounds = self.config.discussion_rounds;
        let ((), snap) = self.with_room(room_id, |state, _events| {
            if state.phase != Phase::DayDiscussion {
                return Err(DomainError::validation(
                    ValidationKind::InvalidPhase,
                    "the vote can only be called during day discussion",
                ));
            }
            // Cross the round bound; the transition loop emits PhaseChanged.
            state.round = max_rounds + 1;
            Ok(())
        })?;
        Ok(snap)
    }

    /// Idempotent stall recovery: move exactly one pending actor forward,
    /// then run the transition loop. Safe to invoke redundantly — a call
    /// with nothing pending changes nothing and emits no event, and a race
    /// against a genuine submission resolves through the validator's
    /// duplicate check (first valid submission wins).
    pub fn force_advance(&self, room_id: RoomId) -> Result<Arc<SessionSnapshot>, AppError> {
        self.force_advance_inner(room_id, false)
    }

    /// Watchdog variant: only forces when the pending actor is automated.
    pub fn force_advance_automated(
        &self,
        room_id: RoomId,
    ) -> Result<Arc<SessionSnapshot>, AppError> {
        self.force_advance_inner(room_id, true)
    }

    fn force_advance_inner(
        &self,
        room_id: RoomId,
        automated_only: bool,
    ) -> Result<Arc<SessionSnapshot>, AppError> {
        let max_rounds = self.config.discussion_rounds;
        let ((), snap) = self.with_room(room_id, |state, events| {
            let Some(pending) = pending_actor(state) else {
                return Ok(());
            };
            if automated_only
                && state
                    .participant(pending)
                    .map(|p| p.is_human)
                    .unwrap_or(false)
            {
                return Ok(());
            }
            info!(
                room_id = state.room_id,
                participant = pending,
                phase = ?state.phase,
                "Force-advancing stalled participant"
            );
            state.push_event(
                events,
                EventKind::TurnForced {
                    participant: pending,
                    phase: state.phase,
                },
            );
            match state.phase {
                Phase::DayDiscussion => {
                    if let Advance::Speaker(speaker) = sequencer::advance(state, max_rounds) {
                        state.push_event(
                            events,
                            EventKind::SpeakerChanged {
                                speaker,
                                round: state.round,
                            },
                        );
                    }
                }
                Phase::DayVote => {
                    state.vote.abstained.insert(pending);
                }
                Phase::Night => {
                    state.night.forced.insert(pending);
                }
                Phase::Waiting | Phase::Finished => {}
            }
            Ok(())
        })?;
        Ok(snap)
    }
}

/// The actor the current phase is blocked on, if any. Deterministic: roster
/// order for votes and night actions, turn order for speech.
fn pending_actor(state: &SessionState) -> Option<ParticipantId> {
    match state.phase {
        Phase::DayDiscussion => state.current_speaker(),
        Phase::DayVote => state
            .living()
            .map(|p| p.id)
            .find(|id| !has_ballot(state, *id)),
        Phase::Night => state
            .living()
            .filter(|p| p.role.night_action().is_some())
            .map(|p| p.id)
            .find(|id| !has_night_action(state, *id)),
        Phase::Waiting | Phase::Finished => None,
    }
}
