//! Session store port.
//!
//! Holds the live (open or closed) registration sessions of every chat,
//! keyed by `(chat_id, session_id)`. Terminal sessions are removed.

use async_trait::async_trait;

use crate::domain::foundation::{BookId, ChatId, DomainError, SessionId};
use crate::domain::session::RegistrationSession;

/// Store port for live registration sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a newly opened session.
    async fn insert(&self, session: &RegistrationSession) -> Result<(), DomainError>;

    /// Overwrite an existing session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the session is not in the store
    async fn update(&self, session: &RegistrationSession) -> Result<(), DomainError>;

    /// Find a session by its chat-scoped key.
    async fn get(
        &self,
        chat_id: ChatId,
        session_id: SessionId,
    ) -> Result<Option<RegistrationSession>, DomainError>;

    /// Find a session by its global booking id, across all chats.
    async fn find_by_book_id(
        &self,
        book_id: BookId,
    ) -> Result<Option<RegistrationSession>, DomainError>;

    /// All live sessions of a chat, oldest booking first.
    async fn list_by_chat(&self, chat_id: ChatId) -> Result<Vec<RegistrationSession>, DomainError>;

    /// Remove a session.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if the session is not in the store
    async fn remove(&self, chat_id: ChatId, session_id: SessionId) -> Result<(), DomainError>;

    /// Move every live session of `from` to `to`, including the chat id
    /// each session carries. Returns how many sessions moved.
    async fn rekey_chat(&self, from: ChatId, to: ChatId) -> Result<usize, DomainError>;
}
