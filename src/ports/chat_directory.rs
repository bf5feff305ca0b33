//! Chat directory port.
//!
//! Lookup of chat settings and bus timings. The only write is the re-key
//! that follows a chat being given a new id.

use async_trait::async_trait;

use crate::domain::chat::{Bus, ChatConfig};
use crate::domain::foundation::{BusId, ChatId, DomainError};

/// Lookup port for chat configuration.
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    /// Settings of one chat, if it has been set up.
    async fn get(&self, chat_id: ChatId) -> Result<Option<ChatConfig>, DomainError>;

    /// Every configured chat.
    async fn list(&self) -> Result<Vec<ChatConfig>, DomainError>;

    /// The bus with this id, whichever chat owns it.
    async fn find_bus(&self, bus_id: BusId) -> Result<Option<Bus>, DomainError>;

    /// Move a chat's settings and buses from `from` to `to`. Bus ids, and
    /// with them the schedule overrides, are unchanged.
    ///
    /// # Errors
    ///
    /// - `ChatNotFound` if `from` has no settings
    async fn rekey_chat(&self, from: ChatId, to: ChatId) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_directory_is_object_safe() {
        fn _accepts_dyn(_directory: &dyn ChatDirectory) {}
    }
}
