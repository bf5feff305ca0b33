//! In-memory session store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{BookId, ChatId, DomainError, ErrorCode, SessionId};
use crate::domain::session::RegistrationSession;
use crate::ports::SessionStore;

/// Live sessions grouped per chat.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    chats: Arc<RwLock<HashMap<ChatId, HashMap<SessionId, RegistrationSession>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total live sessions across every chat.
    pub async fn len(&self) -> usize {
        self.chats.read().await.values().map(HashMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

fn not_found(session_id: SessionId) -> DomainError {
    DomainError::new(ErrorCode::SessionNotFound, "Session not found")
        .with_detail("session_id", session_id.to_string())
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: &RegistrationSession) -> Result<(), DomainError> {
        self.chats
            .write()
            .await
            .entry(session.chat_id())
            .or_default()
            .insert(session.id(), session.clone());
        Ok(())
    }

    async fn update(&self, session: &RegistrationSession) -> Result<(), DomainError> {
        let mut chats = self.chats.write().await;
        let slot = chats
            .get_mut(&session.chat_id())
            .and_then(|sessions| sessions.get_mut(&session.id()))
            .ok_or_else(|| not_found(session.id()))?;
        *slot = session.clone();
        Ok(())
    }

    async fn get(
        &self,
        chat_id: ChatId,
        session_id: SessionId,
    ) -> Result<Option<RegistrationSession>, DomainError> {
        Ok(self
            .chats
            .read()
            .await
            .get(&chat_id)
            .and_then(|sessions| sessions.get(&session_id))
            .cloned())
    }

    async fn find_by_book_id(
        &self,
        book_id: BookId,
    ) -> Result<Option<RegistrationSession>, DomainError> {
        Ok(self
            .chats
            .read()
            .await
            .values()
            .flat_map(HashMap::values)
            .find(|s| s.book_id() == book_id)
            .cloned())
    }

    async fn list_by_chat(&self, chat_id: ChatId) -> Result<Vec<RegistrationSession>, DomainError> {
        let mut sessions: Vec<RegistrationSession> = self
            .chats
            .read()
            .await
            .get(&chat_id)
            .map(|sessions| sessions.values().cloned().collect())
            .unwrap_or_default();
        sessions.sort_by_key(|s| s.book_id());
        Ok(sessions)
    }

    async fn remove(&self, chat_id: ChatId, session_id: SessionId) -> Result<(), DomainError> {
        let mut chats = self.chats.write().await;
        let sessions = chats.get_mut(&chat_id).ok_or_else(|| not_found(session_id))?;
        sessions.remove(&session_id).ok_or_else(|| not_found(session_id))?;
        if sessions.is_empty() {
            chats.remove(&chat_id);
        }
        Ok(())
    }

    async fn rekey_chat(&self, from: ChatId, to: ChatId) -> Result<usize, DomainError> {
        let mut chats = self.chats.write().await;
        let Some(moved) = chats.remove(&from) else {
            return Ok(0);
        };
        let count = moved.len();
        let target = chats.entry(to).or_default();
        for (session_id, mut session) in moved {
            session.move_to_chat(to);
            target.insert(session_id, session);
        }
        Ok(count)
    }
}
