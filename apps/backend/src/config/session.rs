use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

/// Orchestrator and sync-layer settings, read from the environment with
/// defaults suitable for local runs.
///
/// The timeout values govern liveness only; eventual progress is the
/// contract, the exact intervals are not.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Discussion rounds before the vote phase opens.
    pub discussion_rounds: u8,
    /// Events retained per room for reconnect catch-up.
    pub replay_buffer: usize,
    /// Server ping cadence on WebSocket sessions.
    pub heartbeat_interval: Duration,
    /// Idle cutoff after which a silent WebSocket client is dropped.
    pub client_timeout: Duration,
    /// Idle time before the stall watchdog force-advances a room.
    pub force_advance_after: Duration,
    /// Watchdog sweep cadence.
    pub watchdog_interval: Duration,
    /// Base seed mixed with the room id for role assignment.
    pub role_seed: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            discussion_rounds: 3,
            replay_buffer: 256,
            heartbeat_interval: Duration::from_secs(20),
            client_timeout: Duration::from_secs(40),
            force_advance_after: Duration::from_secs(10),
            watchdog_interval: Duration::from_secs(2),
            role_seed: 0,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Self::default();
        Ok(Self {
            discussion_rounds: var_parse("BACKEND_DISCUSSION_ROUNDS", defaults.discussion_rounds)?,
            replay_buffer: var_parse("BACKEND_REPLAY_BUFFER", defaults.replay_buffer)?,
            heartbeat_interval: Duration::from_secs(var_parse("BACKEND_WS_HEARTBEAT_SECS", 20)?),
            client_timeout: Duration::from_secs(var_parse("BACKEND_WS_CLIENT_TIMEOUT_SECS", 40)?),
            force_advance_after: Duration::from_secs(var_parse("BACKEND_FORCE_ADVANCE_SECS", 10)?),
            watchdog_interval: Duration::from_secs(var_parse("BACKEND_WATCHDOG_INTERVAL_SECS", 2)?),
            role_seed: var_parse("BACKEND_ROLE_SEED", defaults.role_seed)?,
        })
    }

    /// Short timers so tests never wait on wall-clock defaults.
    pub fn for_tests() -> Self {
        Self {
            discussion_rounds: 3,
            replay_buffer: 256,
            heartbeat_interval: Duration::from_millis(100),
            client_timeout: Duration::from_secs(2),
            force_advance_after: Duration::from_millis(50),
            watchdog_interval: Duration::from_millis(20),
            role_seed: 0,
        }
    }
}

/// Parse an optional environment variable, falling back to the default.
fn var_parse<T: FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| {
            AppError::config(format!(
                "Environment variable '{name}' has an invalid value: '{raw}'"
            ))
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::SessionConfig;

    #[test]
    fn defaults_are_sane() {
        let config = SessionConfig::default();
        assert_eq!(config.discussion_rounds, 3);
        assert!(config.replay_buffer > 0);
        assert!(config.client_timeout > config.heartbeat_interval);
    }
}
