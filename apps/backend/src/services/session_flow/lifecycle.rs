use std::sync::Arc;

use tracing::info;

use super::SessionFlowService;
use crate::domain::events::EventKind;
use crate::domain::roles::Participant;
use crate::domain::sequencer::{self, Advance};
use crate::domain::snapshot::SessionSnapshot;
use crate::domain::state::{Phase, RoomId, SessionState};
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::errors::ErrorCode;

impl SessionFlowService {
    /// Fire the start condition: pull the roster and role map from the
    /// store, fix the turn order (roster order), and enter day 1 discussion.
    pub async fn start_session(&self, room_id: RoomId) -> Result<Arc<SessionSnapshot>, AppError> {
        if self.registry.contains(room_id) {
            return Err(DomainError::conflict(
                ConflictKind::SessionAlreadyStarted,
                format!("room {room_id} already has a running session"),
            )
            .into());
        }

        let roster = self.roster.get_roster(room_id).await?;
        let roles = self.roster.assign_roles(room_id).await?;
        if roles.len() != roster.len() {
            return Err(AppError::internal(
                ErrorCode::InternalError,
                format!(
                    "role map size {} does not match roster size {}",
                    roles.len(),
                    roster.len()
                ),
            ));
        }

        let participants: Vec<Participant> = roster
            .into_iter()
            .zip(roles)
            .enumerate()
            .map(|(id, (entry, role))| Participant {
                id: id as u8,
                name: entry.name,
                is_human: entry.is_human,
                alive: true,
                role,
                persona: entry.persona,
            })
            .collect();

        info!(room_id, participants = participants.len(), "Starting session");

        let mut state = SessionState::new(room_id, participants);
        let mut events = Vec::new();
        state.turn_order = state.participants.iter().map(|p| p.id).collect();
        state.day = 1;
        state.round = 1;
        state.phase = Phase::DayDiscussion;
        state.push_event(
            &mut events,
            EventKind::SessionStarted {
                turn_order: state.turn_order.clone(),
            },
        );
        state.push_event(
            &mut events,
            EventKind::PhaseChanged {
                phase: Phase::DayDiscussion,
                day: 1,
                round: 1,
            },
        );
        if let Advance::Speaker(speaker) =
            sequencer::first_speaker(&mut state, self.config.discussion_rounds)
        {
            state.push_event(&mut events, EventKind::SpeakerChanged { speaker, round: 1 });
        }

        // Insert is atomic on the room id; a concurrent start loses here.
        let handle = self.registry.insert(state)?;
        self.publish(room_id, &events);
        Ok(handle.snapshot())
    }

    /// Tear the room down. The replay buffer goes with it; connected
    /// subscribers receive the closing event first.
    pub fn close_session(&self, room_id: RoomId) -> Result<(), AppError> {
        let handle = self.registry.get(room_id)?;
        let mut events = Vec::new();
        {
            let mut state = handle.state.lock();
            state.push_event(&mut events, EventKind::SessionClosed);
        }
        self.publish(room_id, &events);
        self.registry.remove(room_id);
        self.hub.drop_room(room_id);
        info!(room_id, "Session closed");
        Ok(())
    }
}
