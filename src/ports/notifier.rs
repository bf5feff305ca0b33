//! Notification ports.
//!
//! Delivery is fire-and-forget: implementations report the outcome but
//! never fail the caller. An unreachable rider (one who never opened a
//! private chat with the bot) must not undo a booking.

use async_trait::async_trait;

use crate::domain::notice::{Notice, NotifyTarget};
use crate::domain::session::RegistrationSession;

/// Outcome of one delivery attempt, kept for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Failed(String),
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

/// Port for sending notices to chats and riders.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, target: NotifyTarget, notice: &Notice) -> Delivery;
}

/// Port for (re)drawing the message surface of a session.
///
/// Open sessions get Join/Cancel affordances; every other state gets a
/// closed surface.
#[async_trait]
pub trait SessionRenderer: Send + Sync {
    async fn render(&self, session: &RegistrationSession) -> Delivery;
}
