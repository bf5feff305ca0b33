//! Session-specific error types.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, RiderId, SessionState};

/// Errors raised by roster mutations and lifecycle transitions.
///
/// Every variant leaves the session untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Registration is full ({capacity} riders)")]
    CapacityExceeded { capacity: u32 },

    #[error("Rider {0} is already registered")]
    AlreadyJoined(RiderId),

    #[error("Rider {0} is not registered")]
    NotJoined(RiderId),

    #[error("Unknown session")]
    UnknownSession,

    /// Join or leave against a session that is not accepting riders.
    #[error("Registration is not open (currently {state})")]
    NotOpen { state: SessionState },

    #[error("Cannot move session from {from} to {to}")]
    InvalidTransition { from: SessionState, to: SessionState },

    #[error("Validation failed for '{field}': {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Session storage error: {0}")]
    Infrastructure(String),
}

impl SessionError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SessionError::Infrastructure(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::CapacityExceeded { .. } => ErrorCode::CapacityExceeded,
            SessionError::AlreadyJoined(_) => ErrorCode::AlreadyJoined,
            SessionError::NotJoined(_) => ErrorCode::NotJoined,
            SessionError::UnknownSession => ErrorCode::SessionNotFound,
            SessionError::NotOpen { .. } => ErrorCode::RegistrationClosed,
            SessionError::InvalidTransition { .. } => ErrorCode::InvalidStateTransition,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for SessionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::SessionNotFound => SessionError::UnknownSession,
            _ => SessionError::Infrastructure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_per_rejection() {
        assert_eq!(
            SessionError::CapacityExceeded { capacity: 2 }.code(),
            ErrorCode::CapacityExceeded
        );
        assert_eq!(
            SessionError::NotOpen {
                state: SessionState::Closed
            }
            .code(),
            ErrorCode::RegistrationClosed
        );
    }

    #[test]
    fn not_found_domain_error_becomes_unknown_session() {
        let err = DomainError::new(ErrorCode::SessionNotFound, "gone");
        assert_eq!(SessionError::from(err), SessionError::UnknownSession);
    }

    #[test]
    fn display_is_user_readable() {
        let err = SessionError::AlreadyJoined(RiderId::new(5));
        assert_eq!(err.to_string(), "Rider 5 is already registered");
    }
}
