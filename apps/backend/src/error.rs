use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;

/// RFC 7807 style error body.
#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Channel unavailable: {detail}")]
    ChannelUnavailable { detail: String },
    #[error("Internal error: {detail}")]
    Internal { code: ErrorCode, detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    /// Error code for any variant
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::NotFound { code, .. } => *code,
            AppError::Forbidden { code, .. } => *code,
            AppError::Conflict { code, .. } => *code,
            AppError::ChannelUnavailable { .. } => ErrorCode::ChannelUnavailable,
            AppError::Internal { code, .. } => *code,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. } => detail.clone(),
            AppError::NotFound { detail, .. } => detail.clone(),
            AppError::Forbidden { detail, .. } => detail.clone(),
            AppError::Conflict { detail, .. } => detail.clone(),
            AppError::ChannelUnavailable { detail } => detail.clone(),
            AppError::Internal { detail, .. } => detail.clone(),
            AppError::Config { detail } => detail.clone(),
        }
    }

    /// HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::ChannelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Internal {
            code,
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => match kind {
                ValidationKind::InvalidPhase => AppError::Validation {
                    code: ErrorCode::InvalidPhase,
                    detail,
                },
                ValidationKind::NotAuthorized => AppError::Forbidden {
                    code: ErrorCode::NotAuthorized,
                    detail,
                },
                ValidationKind::DuplicateAction => AppError::Conflict {
                    code: ErrorCode::DuplicateAction,
                    detail,
                },
                ValidationKind::IllegalTarget => AppError::Validation {
                    code: ErrorCode::IllegalTarget,
                    detail,
                },
                _ => AppError::Validation {
                    code: ErrorCode::ValidationError,
                    detail,
                },
            },
            DomainError::NotFound(kind, detail) => match kind {
                NotFoundKind::Session => AppError::NotFound {
                    code: ErrorCode::SessionNotFound,
                    detail,
                },
                NotFoundKind::Participant => AppError::NotFound {
                    code: ErrorCode::ParticipantNotFound,
                    detail,
                },
                NotFoundKind::Roster => AppError::NotFound {
                    code: ErrorCode::RosterNotFound,
                    detail,
                },
                _ => AppError::NotFound {
                    code: ErrorCode::NotFound,
                    detail,
                },
            },
            DomainError::Conflict(kind, detail) => match kind {
                ConflictKind::SessionAlreadyStarted => AppError::Conflict {
                    code: ErrorCode::SessionAlreadyStarted,
                    detail,
                },
                _ => AppError::Conflict {
                    code: ErrorCode::Conflict,
                    detail,
                },
            },
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::ChannelUnavailable => AppError::ChannelUnavailable { detail },
                _ => AppError::Internal {
                    code: ErrorCode::InternalError,
                    detail,
                },
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let body = ProblemDetails {
            type_: "about:blank".to_string(),
            title: status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            status: status.as_u16(),
            detail: self.detail(),
            code: self.code().as_str().to_string(),
        };
        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;
    use crate::errors::domain::{DomainError, ValidationKind};
    use crate::errors::ErrorCode;

    #[test]
    fn duplicate_action_maps_to_conflict() {
        let err: AppError =
            DomainError::validation(ValidationKind::DuplicateAction, "already voted").into();
        assert_eq!(err.code(), ErrorCode::DuplicateAction);
        assert_eq!(err.status().as_u16(), 409);
    }

    #[test]
    fn not_authorized_maps_to_forbidden() {
        let err: AppError =
            DomainError::validation(ValidationKind::NotAuthorized, "dead actor").into();
        assert_eq!(err.code(), ErrorCode::NotAuthorized);
        assert_eq!(err.status().as_u16(), 403);
    }
}
