//! Recording notifier and renderer for tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::foundation::RiderId;
use crate::domain::notice::{Notice, NotifyTarget};
use crate::domain::session::RegistrationSession;
use crate::ports::{Delivery, Notifier, SessionRenderer};

/// Keeps every notice it is handed.
///
/// Riders marked unreachable get `Delivery::Failed`, like a rider who never
/// opened a private chat with the bot.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(NotifyTarget, Notice)>>>,
    unreachable: Arc<Mutex<HashSet<RiderId>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn mark_unreachable(&self, rider_id: RiderId) {
        self.unreachable.lock().await.insert(rider_id);
    }

    pub async fn sent(&self) -> Vec<(NotifyTarget, Notice)> {
        self.sent.lock().await.clone()
    }

    /// Notices sent to one target, in order.
    pub async fn sent_to(&self, target: NotifyTarget) -> Vec<Notice> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(t, _)| *t == target)
            .map(|(_, n)| n.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.sent.lock().await.clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, target: NotifyTarget, notice: &Notice) -> Delivery {
        if let NotifyTarget::Rider(rider_id) = target {
            if self.unreachable.lock().await.contains(&rider_id) {
                return Delivery::Failed(format!("rider {} has not started the bot", rider_id));
            }
        }
        self.sent.lock().await.push((target, notice.clone()));
        Delivery::Delivered
    }
}

/// Keeps a snapshot of every rendered surface.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    rendered: Arc<Mutex<Vec<RegistrationSession>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn rendered(&self) -> Vec<RegistrationSession> {
        self.rendered.lock().await.clone()
    }

    pub async fn last(&self) -> Option<RegistrationSession> {
        self.rendered.lock().await.last().cloned()
    }
}

#[async_trait]
impl SessionRenderer for RecordingRenderer {
    async fn render(&self, session: &RegistrationSession) -> Delivery {
        self.rendered.lock().await.push(session.clone());
        Delivery::Delivered
    }
}
