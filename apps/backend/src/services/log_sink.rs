//! Write-only event stream for the persisted-log collaborator.

use tracing::info;

use crate::domain::events::SessionEvent;

/// Consumer of the session event stream. The core only writes; it never
/// reads the sink back.
pub trait EventSink: Send + Sync {
    fn append(&self, event: &SessionEvent);
}

/// Default sink: structured log lines.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn append(&self, event: &SessionEvent) {
        info!(
            room_id = event.room_id,
            seq = event.seq,
            kind = ?event.kind,
            "session event"
        );
    }
}
