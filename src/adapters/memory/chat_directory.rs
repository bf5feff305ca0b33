//! In-memory chat directory.
//!
//! Chat settings are normally maintained by a separate settings flow; this
//! adapter lets tests and local runs register chats directly.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::chat::{Bus, ChatConfig};
use crate::domain::foundation::{BusId, ChatId, DomainError, ErrorCode};
use crate::ports::ChatDirectory;

#[derive(Debug, Clone, Default)]
pub struct InMemoryChatDirectory {
    chats: Arc<RwLock<BTreeMap<ChatId, ChatConfig>>>,
}

impl InMemoryChatDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a chat's settings.
    pub async fn register(&self, chat: ChatConfig) {
        self.chats.write().await.insert(chat.chat_id, chat);
    }
}

#[async_trait]
impl ChatDirectory for InMemoryChatDirectory {
    async fn get(&self, chat_id: ChatId) -> Result<Option<ChatConfig>, DomainError> {
        Ok(self.chats.read().await.get(&chat_id).cloned())
    }

    async fn list(&self) -> Result<Vec<ChatConfig>, DomainError> {
        Ok(self.chats.read().await.values().cloned().collect())
    }

    async fn find_bus(&self, bus_id: BusId) -> Result<Option<Bus>, DomainError> {
        Ok(self
            .chats
            .read()
            .await
            .values()
            .flat_map(|chat| chat.buses.iter())
            .find(|bus| bus.bus_id == bus_id)
            .cloned())
    }

    async fn rekey_chat(&self, from: ChatId, to: ChatId) -> Result<(), DomainError> {
        let mut chats = self.chats.write().await;
        let mut chat = chats.remove(&from).ok_or_else(|| {
            DomainError::new(ErrorCode::ChatNotFound, "Chat has not been set up")
                .with_detail("chat_id", from.to_string())
        })?;
        chat.chat_id = to;
        for bus in &mut chat.buses {
            bus.chat_id = to;
        }
        chats.insert(to, chat);
        Ok(())
    }
}
