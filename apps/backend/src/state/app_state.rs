use std::sync::Arc;

use crate::config::session::SessionConfig;
use crate::services::log_sink::{EventSink, TracingSink};
use crate::services::registry::SessionRegistry;
use crate::services::roster::RosterStore;
use crate::services::session_flow::SessionFlowService;
use crate::ws::hub::WsRegistry;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    registry: Arc<SessionRegistry>,
    ws: Arc<WsRegistry>,
    flow: Arc<SessionFlowService>,
    config: SessionConfig,
}

impl AppState {
    pub fn new(
        roster: Arc<dyn RosterStore>,
        sink: Arc<dyn EventSink>,
        config: SessionConfig,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let ws = Arc::new(WsRegistry::new(config.replay_buffer));
        let flow = Arc::new(SessionFlowService::new(
            registry.clone(),
            ws.clone(),
            sink,
            roster,
            config.clone(),
        ));
        Self {
            registry,
            ws,
            flow,
            config,
        }
    }

    /// State with the default tracing-backed log sink.
    pub fn with_tracing_sink(roster: Arc<dyn RosterStore>, config: SessionConfig) -> Self {
        Self::new(roster, Arc::new(TracingSink), config)
    }

    pub fn flow(&self) -> &Arc<SessionFlowService> {
        &self.flow
    }

    pub fn session_registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    pub fn ws_registry(&self) -> &Arc<WsRegistry> {
        &self.ws
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}
