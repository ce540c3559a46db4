//! Reconnect backoff policy: exponential with a cap, plus jitter.

use std::time::Duration;

pub const INITIAL_RETRY_DELAY_SECS: u64 = 1;
pub const MAX_RETRY_DELAY_SECS: u64 = 30;
pub const RETRY_DELAY_MULTIPLIER: f64 = 2.0;
pub const JITTER_PERCENT: f64 = 0.2;

/// Deterministic part of the schedule: base 1s, doubled per attempt,
/// capped at 30s. `attempt` is 1-based.
pub fn retry_delay_base(attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31) as i32;
    let base = INITIAL_RETRY_DELAY_SECS as f64 * RETRY_DELAY_MULTIPLIER.powi(exponent);
    Duration::from_secs_f64(base.min(MAX_RETRY_DELAY_SECS as f64))
}

/// Full delay with +/- 20% jitter so a fleet of clients does not reconnect
/// in lockstep.
pub fn retry_delay(attempt: u32) -> Duration {
    let capped = retry_delay_base(attempt).as_secs_f64();
    let jitter_range = capped * JITTER_PERCENT;
    let jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter_range;
    Duration::from_secs_f64((capped + jitter).max(0.1))
}
