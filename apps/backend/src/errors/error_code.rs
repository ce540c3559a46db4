//! Error codes for the session backend API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the session backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Game rule rejections
    /// Action not legal in the current phase
    InvalidPhase,
    /// Actor dead, not a room member, not their turn, or not their role
    NotAuthorized,
    /// Already acted this night / voted this round
    DuplicateAction,
    /// Self-target, dead target, or nonexistent target
    IllegalTarget,
    /// General validation error
    ValidationError,

    // Resource Not Found
    /// Session not found
    SessionNotFound,
    /// Participant not found
    ParticipantNotFound,
    /// No roster registered for the room
    RosterNotFound,
    /// General not found error
    NotFound,

    // Conflicts
    /// Session already started for this room
    SessionAlreadyStarted,
    /// General conflict
    Conflict,

    // Infrastructure
    /// Transient sync-layer failure
    ChannelUnavailable,
    /// General bad request error
    BadRequest,
    /// Internal server error
    InternalError,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Canonical SCREAMING_SNAKE_CASE string for HTTP responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidPhase => "INVALID_PHASE",
            ErrorCode::NotAuthorized => "NOT_AUTHORIZED",
            ErrorCode::DuplicateAction => "DUPLICATE_ACTION",
            ErrorCode::IllegalTarget => "ILLEGAL_TARGET",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::ParticipantNotFound => "PARTICIPANT_NOT_FOUND",
            ErrorCode::RosterNotFound => "ROSTER_NOT_FOUND",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::SessionAlreadyStarted => "SESSION_ALREADY_STARTED",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::ChannelUnavailable => "CHANNEL_UNAVAILABLE",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::InternalError => "INTERNAL",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;

    #[test]
    fn codes_are_screaming_snake_case() {
        let codes = [
            ErrorCode::InvalidPhase,
            ErrorCode::NotAuthorized,
            ErrorCode::DuplicateAction,
            ErrorCode::IllegalTarget,
            ErrorCode::SessionNotFound,
            ErrorCode::ChannelUnavailable,
        ];
        for code in codes {
            let s = code.as_str();
            assert!(s
                .chars()
                .all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }
}
