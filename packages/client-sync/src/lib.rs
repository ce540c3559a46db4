//! Client-side supervisor for the session backend's realtime channel.
//!
//! Maintains one resilient WebSocket per client: exponential-backoff
//! reconnect with a cap, heartbeat liveness, catch-up by last-seen sequence
//! number on every reconnect, and a connection-quality signal for the UI
//! layer. Connectivity failures never surface as game-logic errors.

pub mod backoff;
pub mod protocol;
pub mod supervisor;

pub use supervisor::{
    ChannelUpdate, ConnectionQuality, ConnectionStatus, ConnectionSupervisor, SupervisorConfig,
    SupervisorHandle,
};
