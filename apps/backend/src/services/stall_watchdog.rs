//! Liveness driver: periodically force-advances rooms stuck on an
//! automated participant longer than the configured timeout.
//!
//! This is the in-process stand-in for the external AI fallback driver. It
//! goes through the same public force-advance operation as any client, so
//! races against genuine submissions resolve in the validator.

use std::sync::Arc;

use tokio::time::interval;
use tracing::{debug, warn};

use crate::services::session_flow::SessionFlowService;

pub fn spawn(flow: Arc<SessionFlowService>) -> tokio::task::JoinHandle<()> {
    let sweep = flow.config().watchdog_interval;
    let idle_after = flow.config().force_advance_after;
    tokio::spawn(async move {
        let mut ticker = interval(sweep);
        loop {
            ticker.tick().await;
            for room_id in flow.registry().room_ids() {
                let Ok(handle) = flow.registry().get(room_id) else {
                    continue;
                };
                let idle = handle.last_progress.lock().elapsed();
                if idle < idle_after {
                    continue;
                }
                debug!(
                    room_id,
                    idle_ms = idle.as_millis() as u64,
                    "Room idle, force-advancing"
                );
                if let Err(err) = flow.force_advance_automated(room_id) {
                    warn!(room_id, error = %err, "Force-advance failed");
                }
            }
        }
    })
}
