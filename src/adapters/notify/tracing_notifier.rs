//! Notifier and renderer that write to the log.
//!
//! Stands in for the chat transport when the service runs headless: every
//! notice and every session redraw becomes a structured log line.

use async_trait::async_trait;
use std::sync::Arc;

use super::messages::{notice_text, registration_text};
use crate::domain::notice::{Notice, NotifyTarget};
use crate::domain::session::RegistrationSession;
use crate::ports::{ChatDirectory, Delivery, Notifier, SessionRenderer};

#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, target: NotifyTarget, notice: &Notice) -> Delivery {
        let text = notice_text(notice);
        match target {
            NotifyTarget::Chat(chat_id) => {
                tracing::info!(chat_id = %chat_id, "notice: {}", text)
            }
            NotifyTarget::Rider(rider_id) => {
                tracing::info!(rider_id = %rider_id, "private notice: {}", text)
            }
        }
        Delivery::Delivered
    }
}

/// Renders sessions as log lines, looking up route names per chat.
pub struct TracingSessionRenderer {
    directory: Arc<dyn ChatDirectory>,
}

impl TracingSessionRenderer {
    pub fn new(directory: Arc<dyn ChatDirectory>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl SessionRenderer for TracingSessionRenderer {
    async fn render(&self, session: &RegistrationSession) -> Delivery {
        let chat = match self.directory.get(session.chat_id()).await {
            Ok(chat) => chat,
            Err(e) => return Delivery::Failed(e.to_string()),
        };
        let text = registration_text(session, chat.as_ref());
        tracing::info!(
            chat_id = %session.chat_id(),
            session_id = %session.id(),
            state = %session.state(),
            buttons = session.state().accepts_riders(),
            "session surface:\n{}",
            text
        );
        Delivery::Delivered
    }
}
