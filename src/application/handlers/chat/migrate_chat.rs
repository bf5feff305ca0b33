//! MigrateChatHandler - follows a group chat to its new id.
//!
//! When a group is upgraded the chat platform assigns it a new id. Settings
//! and buses move first, then live sessions and ridership rows. Schedule
//! overrides are keyed by bus and need no change.

use serde::Serialize;
use std::sync::Arc;

use crate::application::{CommandError, SessionLifecycleController};
use crate::domain::foundation::{BusId, ChatId};
use crate::ports::ChatDirectory;

#[derive(Debug, Clone, Copy)]
pub struct MigrateChatCommand {
    pub from: ChatId,
    pub to: ChatId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrateChatResult {
    pub from: ChatId,
    pub to: ChatId,
    pub buses: Vec<BusId>,
    pub sessions: usize,
    pub ridership_rows: usize,
}

pub struct MigrateChatHandler {
    directory: Arc<dyn ChatDirectory>,
    lifecycle: Arc<SessionLifecycleController>,
}

impl MigrateChatHandler {
    pub fn new(
        directory: Arc<dyn ChatDirectory>,
        lifecycle: Arc<SessionLifecycleController>,
    ) -> Self {
        Self {
            directory,
            lifecycle,
        }
    }

    /// # Errors
    ///
    /// - `UnknownChat` if `from` has no settings
    /// - `ChatAlreadySetUp` if `to` already has settings (including `from == to`)
    pub async fn handle(&self, cmd: MigrateChatCommand) -> Result<MigrateChatResult, CommandError> {
        let chat = self
            .directory
            .get(cmd.from)
            .await?
            .ok_or(CommandError::UnknownChat(cmd.from))?;
        if self.directory.get(cmd.to).await?.is_some() {
            return Err(CommandError::ChatAlreadySetUp(cmd.to));
        }

        self.directory.rekey_chat(cmd.from, cmd.to).await?;
        let moved = self.lifecycle.migrate_chat(cmd.from, cmd.to).await?;

        Ok(MigrateChatResult {
            from: cmd.from,
            to: cmd.to,
            buses: chat.buses.iter().map(|b| b.bus_id).collect(),
            sessions: moved.sessions,
            ridership_rows: moved.ridership_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryChatDirectory, InMemoryRidershipLedger, InMemorySessionStore,
    };
    use crate::adapters::notify::{RecordingNotifier, RecordingRenderer};
    use crate::application::OpenSession;
    use crate::domain::chat::{Bus, ChatConfig, ChatType};
    use crate::ports::SessionStore;
    use chrono::NaiveDate;

    const OLD: ChatId = ChatId::new(-100);
    const NEW: ChatId = ChatId::new(-100_200);

    struct Fixture {
        handler: MigrateChatHandler,
        directory: Arc<InMemoryChatDirectory>,
        sessions: Arc<InMemorySessionStore>,
        lifecycle: Arc<SessionLifecycleController>,
    }

    fn chat(chat_id: ChatId) -> ChatConfig {
        ChatConfig {
            chat_id,
            chat_type: ChatType::Service,
            max_riders: 5,
            pickup: "Camp".to_string(),
            destination: "Station".to_string(),
            buses: vec![Bus {
                bus_id: BusId::new(4),
                chat_id,
                time: "0630".to_string(),
            }],
        }
    }

    async fn fixture() -> Fixture {
        let directory = Arc::new(InMemoryChatDirectory::new());
        directory.register(chat(OLD)).await;
        let sessions = Arc::new(InMemorySessionStore::new());
        let lifecycle = Arc::new(SessionLifecycleController::new(
            sessions.clone(),
            Arc::new(InMemoryRidershipLedger::new()),
            directory.clone(),
            Arc::new(RecordingNotifier::new()),
            Arc::new(RecordingRenderer::new()),
        ));
        Fixture {
            handler: MigrateChatHandler::new(directory.clone(), lifecycle.clone()),
            directory,
            sessions,
            lifecycle,
        }
    }

    #[tokio::test]
    async fn moves_settings_buses_and_sessions() {
        let f = fixture().await;
        f.lifecycle
            .open(OpenSession {
                chat_id: OLD,
                bus_id: Some(BusId::new(4)),
                date: NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
                time_slot: "0630".to_string(),
                capacity: 5,
            })
            .await
            .unwrap();

        let result = f
            .handler
            .handle(MigrateChatCommand { from: OLD, to: NEW })
            .await
            .unwrap();

        assert_eq!(result.buses, vec![BusId::new(4)]);
        assert_eq!(result.sessions, 1);
        assert_eq!(result.ridership_rows, 1);
        assert!(f.directory.get(OLD).await.unwrap().is_none());
        assert_eq!(
            f.directory.find_bus(BusId::new(4)).await.unwrap().map(|b| b.chat_id),
            Some(NEW)
        );
        assert_eq!(f.sessions.list_by_chat(NEW).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_source_chat_is_rejected() {
        let f = fixture().await;
        let err = f
            .handler
            .handle(MigrateChatCommand {
                from: ChatId::new(-7),
                to: NEW,
            })
            .await
            .unwrap_err();
        assert_eq!(err, CommandError::UnknownChat(ChatId::new(-7)));
    }

    #[tokio::test]
    async fn existing_target_chat_is_left_alone() {
        let f = fixture().await;
        f.directory.register(chat(NEW)).await;

        let err = f
            .handler
            .handle(MigrateChatCommand { from: OLD, to: NEW })
            .await
            .unwrap_err();

        assert_eq!(err, CommandError::ChatAlreadySetUp(NEW));
        assert!(f.directory.get(OLD).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn migrating_onto_itself_is_rejected() {
        let f = fixture().await;
        let err = f
            .handler
            .handle(MigrateChatCommand { from: OLD, to: OLD })
            .await
            .unwrap_err();
        assert_eq!(err, CommandError::ChatAlreadySetUp(OLD));
    }
}
