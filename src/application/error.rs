//! Command-level errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{ChatId, DomainError, ErrorCode};
use crate::domain::schedule::ScheduleError;
use crate::domain::session::SessionError;

/// What a caller must be to issue a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Any member of the chat.
    Member,
    /// An admin of a service chat.
    ServiceChatAdmin,
    /// An admin of an admin chat.
    AdminChatAdmin,
    /// The timer that fires the daily runs.
    System,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Capability::Member => "chat member",
            Capability::ServiceChatAdmin => "service chat admin",
            Capability::AdminChatAdmin => "admin chat admin",
            Capability::System => "system trigger",
        };
        f.write_str(s)
    }
}

/// Errors returned by the command dispatcher and its handlers.
///
/// Every variant means the command had no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Forbidden: requires {required}")]
    Forbidden { required: Capability },

    #[error("Chat {0} has not been set up")]
    UnknownChat(ChatId),

    #[error("Chat {0} is already set up")]
    ChatAlreadySetUp(ChatId),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl CommandError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CommandError::Forbidden { .. } => ErrorCode::Forbidden,
            CommandError::UnknownChat(_) => ErrorCode::ChatNotFound,
            CommandError::ChatAlreadySetUp(_) => ErrorCode::ChatAlreadyExists,
            CommandError::Session(e) => e.code(),
            CommandError::Schedule(e) => e.code(),
            CommandError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }
}

impl From<DomainError> for CommandError {
    fn from(err: DomainError) -> Self {
        CommandError::Infrastructure(err.to_string())
    }
}
