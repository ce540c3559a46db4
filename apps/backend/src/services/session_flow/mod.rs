//! Session orchestration service — the single writer of session state.
//!
//! Public operations validate through the domain layer, mutate the room
//! under its lock, run the transition loop until the session settles,
//! refresh the copy-on-write snapshot, and fan the produced events out to
//! the sync layer and the log sink with the lock released.
//!
//! Mutation closures must validate fully before touching state: a rejection
//! leaves the session untouched (no partial application).

mod lifecycle;
mod orchestration;
mod player_actions;

use std::sync::Arc;
use std::time::Instant;

use crate::config::session::SessionConfig;
use crate::domain::events::SessionEvent;
use crate::domain::snapshot::{self, SessionSnapshot, ViewerState};
use crate::domain::state::{ParticipantId, RoomId, SessionState};
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::services::log_sink::EventSink;
use crate::services::registry::SessionRegistry;
use crate::services::roster::RosterStore;
use crate::ws::hub::WsRegistry;

pub struct SessionFlowService {
    registry: Arc<SessionRegistry>,
    hub: Arc<WsRegistry>,
    sink: Arc<dyn EventSink>,
    roster: Arc<dyn RosterStore>,
    config: SessionConfig,
}

impl SessionFlowService {
    pub fn new(
        registry: Arc<SessionRegistry>,
        hub: Arc<WsRegistry>,
        sink: Arc<dyn EventSink>,
        roster: Arc<dyn RosterStore>,
        config: SessionConfig,
    ) -> Self {
        Self {
            registry,
            hub,
            sink,
            roster,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Lock-free read of the current public snapshot.
    pub fn get_state(&self, room_id: RoomId) -> Result<Arc<SessionSnapshot>, AppError> {
        Ok(self.registry.get(room_id)?.snapshot())
    }

    /// Snapshot plus the viewer's private projection. Takes the room lock
    /// briefly, since investigation results are not part of the public view.
    pub fn get_state_for(
        &self,
        room_id: RoomId,
        viewer: ParticipantId,
    ) -> Result<(SessionSnapshot, ViewerState), AppError> {
        let handle = self.registry.get(room_id)?;
        let state = handle.state.lock();
        Ok((
            snapshot::snapshot(&state),
            snapshot::viewer_state(&state, Some(viewer)),
        ))
    }

    /// Serialized mutation: apply `f` under the room lock, run the
    /// transition loop, publish the refreshed snapshot, then fan out the
    /// produced events outside the lock.
    fn with_room<T>(
        &self,
        room_id: RoomId,
        f: impl FnOnce(&mut SessionState, &mut Vec<SessionEvent>) -> Result<T, DomainError>,
    ) -> Result<(T, Arc<SessionSnapshot>), AppError> {
        let handle = self.registry.get(room_id)?;
        let mut events = Vec::new();
        let (value, snap) = {
            let mut state = handle.state.lock();
            let value = f(&mut state, &mut events)?;
            orchestration::process_session_state(&mut state, &mut events, &self.config)?;
            let snap = Arc::new(snapshot::snapshot(&state));
            handle.store_snapshot(snap.clone());
            (value, snap)
        };
        if !events.is_empty() {
            *handle.last_progress.lock() = Instant::now();
            self.publish(room_id, &events);
        }
        Ok((value, snap))
    }

    /// Event fan-out is fire-and-forget for the orchestrator: per-client
    /// delivery happens on the sync layer's mailboxes and may lag or fail
    /// without blocking a mutation.
    fn publish(&self, room_id: RoomId, events: &[SessionEvent]) {
        for event in events {
            self.sink.append(event);
        }
        self.hub.publish(room_id, events);
    }
}
