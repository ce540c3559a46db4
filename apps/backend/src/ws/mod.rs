//! Realtime sync layer: connection registry, replay buffer, wire protocol.

pub mod hub;
pub mod protocol;
pub mod session;
