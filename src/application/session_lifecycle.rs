//! SessionLifecycleController - drives registration sessions through
//! their lifecycle.
//!
//! Every mutation of one session runs as a single critical section under
//! that session's lock: load, check, mutate, persist. Rejected calls leave
//! the stored session untouched, so a repeated tap re-evaluates current
//! state instead of assuming the earlier call succeeded.
//!
//! Rendering and notices are fire-and-forget. A failed delivery is logged
//! and never rolls back the roster or a terminal transition.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use super::KeyedLocks;
use crate::domain::foundation::{BookId, BusId, ChatId, RiderId, SessionId};
use crate::domain::notice::{Notice, NotifyTarget};
use crate::domain::session::{RegistrationSession, Rider, RosterThreshold, SessionError};
use crate::ports::{
    ChatDirectory, Delivery, Notifier, RidershipEntry, RidershipLedger, SessionRenderer,
    SessionStore,
};

/// Booking rules that vary per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    /// A rider may hold a place in only one live session of a chat.
    pub one_booking_per_chat: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            one_booking_per_chat: true,
        }
    }
}

/// Request to open a session.
#[derive(Debug, Clone)]
pub struct OpenSession {
    pub chat_id: ChatId,
    pub bus_id: Option<BusId>,
    pub date: NaiveDate,
    pub time_slot: String,
    pub capacity: u32,
}

/// Result of a successful join or leave.
#[derive(Debug, Clone, Serialize)]
pub struct RosterUpdate {
    pub session: RegistrationSession,
    pub threshold: Option<RosterThreshold>,
}

/// Confirmation tokens handed to the notifier when a session ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenReport {
    pub delivered: usize,
    pub failed: usize,
}

impl TokenReport {
    pub fn absorb(&mut self, other: TokenReport) {
        self.delivered += other.delivered;
        self.failed += other.failed;
    }
}

/// Result of ending a session.
#[derive(Debug, Clone, Serialize)]
pub struct EndedSession {
    pub session: RegistrationSession,
    pub tokens: TokenReport,
}

/// What moved when a chat's bookings followed it to a new id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChatRekey {
    pub sessions: usize,
    pub ridership_rows: usize,
}

pub struct SessionLifecycleController {
    sessions: Arc<dyn SessionStore>,
    ledger: Arc<dyn RidershipLedger>,
    directory: Arc<dyn ChatDirectory>,
    notifier: Arc<dyn Notifier>,
    renderer: Arc<dyn SessionRenderer>,
    policy: BookingPolicy,
    session_locks: KeyedLocks<SessionId>,
    chat_locks: KeyedLocks<ChatId>,
}

impl SessionLifecycleController {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        ledger: Arc<dyn RidershipLedger>,
        directory: Arc<dyn ChatDirectory>,
        notifier: Arc<dyn Notifier>,
        renderer: Arc<dyn SessionRenderer>,
    ) -> Self {
        Self {
            sessions,
            ledger,
            directory,
            notifier,
            renderer,
            policy: BookingPolicy::default(),
            session_locks: KeyedLocks::new(),
            chat_locks: KeyedLocks::new(),
        }
    }

    pub fn with_policy(mut self, policy: BookingPolicy) -> Self {
        self.policy = policy;
        self
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Creation
    // ═══════════════════════════════════════════════════════════════════════

    /// Opens a session with a fresh booking id and a zero-rider ledger row.
    pub async fn open(&self, cmd: OpenSession) -> Result<RegistrationSession, SessionError> {
        let book_id = self.ledger.next_book_id().await?;
        let session = RegistrationSession::open(
            book_id,
            cmd.chat_id,
            cmd.bus_id,
            cmd.date,
            cmd.time_slot,
            cmd.capacity,
        )?;

        self.ledger
            .record_opened(&RidershipEntry {
                book_id,
                chat_id: session.chat_id(),
                date: session.date(),
                time: session.time_slot().to_string(),
                riders: 0,
            })
            .await?;

        if let Err(e) = self.sessions.insert(&session).await {
            if let Err(cleanup) = self.ledger.remove(book_id).await {
                tracing::warn!("Failed to remove ridership row {}: {}", book_id, cleanup);
            }
            return Err(e.into());
        }

        tracing::info!(
            chat_id = %session.chat_id(),
            book_id = %book_id,
            date = %session.date(),
            time_slot = session.time_slot(),
            capacity = session.capacity(),
            "Registration opened"
        );
        self.present(&session).await;
        Ok(session)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Roster
    // ═══════════════════════════════════════════════════════════════════════

    /// Adds a rider to an open session.
    ///
    /// # Errors
    ///
    /// - `UnknownSession` if the session is not live
    /// - `NotOpen` while the session is closed
    /// - `CapacityExceeded` when the roster is full
    /// - `AlreadyJoined` if the rider is on this roster, or on another live
    ///   roster of the chat when one booking per chat is enforced
    pub async fn join(
        &self,
        chat_id: ChatId,
        session_id: SessionId,
        rider: Rider,
    ) -> Result<RosterUpdate, SessionError> {
        // Chat before session, always, so two joins cannot deadlock.
        let _chat_guard = if self.policy.one_booking_per_chat {
            Some(self.chat_locks.lock(chat_id).await)
        } else {
            None
        };
        let _guard = self.session_locks.lock(session_id).await;

        let mut session = self.fetch(chat_id, session_id).await?;
        let rider_id = rider.id();
        let threshold = session.join(rider).inspect_err(|e| {
            tracing::debug!(chat_id = %chat_id, rider_id = %rider_id, "Join rejected: {}", e)
        })?;

        if self.policy.one_booking_per_chat {
            self.ensure_no_other_booking(chat_id, session_id, rider_id)
                .await?;
        }

        self.sessions.update(&session).await?;
        self.present(&session).await;
        if threshold == Some(RosterThreshold::Full) {
            self.announce(
                NotifyTarget::Chat(chat_id),
                Notice::SessionFull {
                    book_id: session.book_id(),
                },
            )
            .await;
        }

        Ok(RosterUpdate { session, threshold })
    }

    /// Removes a rider from an open session.
    ///
    /// # Errors
    ///
    /// - `UnknownSession` if the session is not live
    /// - `NotOpen` while the session is closed
    /// - `NotJoined` if the rider is not on the roster
    pub async fn leave(
        &self,
        chat_id: ChatId,
        session_id: SessionId,
        rider_id: RiderId,
    ) -> Result<RosterUpdate, SessionError> {
        let _guard = self.session_locks.lock(session_id).await;

        let mut session = self.fetch(chat_id, session_id).await?;
        let threshold = session.leave(rider_id).inspect_err(|e| {
            tracing::debug!(chat_id = %chat_id, rider_id = %rider_id, "Leave rejected: {}", e)
        })?;

        self.sessions.update(&session).await?;
        self.present(&session).await;
        if threshold == Some(RosterThreshold::SpacesOpened) {
            self.announce(
                NotifyTarget::Chat(chat_id),
                Notice::SpacesOpened {
                    book_id: session.book_id(),
                },
            )
            .await;
        }

        Ok(RosterUpdate { session, threshold })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Admin lifecycle, addressed by booking id
    // ═══════════════════════════════════════════════════════════════════════

    pub async fn close(&self, book_id: BookId) -> Result<RegistrationSession, SessionError> {
        let (chat_id, session_id) = self.locate(book_id).await?;
        let _guard = self.session_locks.lock(session_id).await;

        let mut session = self.fetch(chat_id, session_id).await?;
        session.close()?;
        self.sessions.update(&session).await?;

        tracing::info!(book_id = %book_id, "Registration closed");
        self.present(&session).await;
        self.announce(NotifyTarget::Chat(chat_id), Notice::RegistrationClosed { book_id })
            .await;
        Ok(session)
    }

    pub async fn reopen(&self, book_id: BookId) -> Result<RegistrationSession, SessionError> {
        let (chat_id, session_id) = self.locate(book_id).await?;
        let _guard = self.session_locks.lock(session_id).await;

        let mut session = self.fetch(chat_id, session_id).await?;
        session.reopen()?;
        self.sessions.update(&session).await?;

        tracing::info!(book_id = %book_id, "Registration reopened");
        self.present(&session).await;
        self.announce(NotifyTarget::Chat(chat_id), Notice::RegistrationReopened { book_id })
            .await;
        Ok(session)
    }

    /// Ends a session: final rider count to the ledger, session out of the
    /// store, one confirmation token per rider.
    pub async fn end(&self, book_id: BookId) -> Result<EndedSession, SessionError> {
        let (chat_id, session_id) = self.locate(book_id).await?;
        let ended = self.end_session(chat_id, session_id).await?;
        self.announce(NotifyTarget::Chat(chat_id), Notice::RegistrationEnded { book_id })
            .await;
        Ok(ended)
    }

    /// Cancels a session: out of the store and the ledger, no tokens.
    pub async fn cancel(&self, book_id: BookId) -> Result<RegistrationSession, SessionError> {
        let (chat_id, session_id) = self.locate(book_id).await?;
        let _guard = self.session_locks.lock(session_id).await;

        let mut session = self.fetch(chat_id, session_id).await?;
        session.cancel()?;
        self.sessions.remove(chat_id, session_id).await?;
        if let Err(e) = self.ledger.remove(book_id).await {
            tracing::warn!("Failed to remove ridership row {}: {}", book_id, e);
        }

        tracing::info!(book_id = %book_id, "Registration cancelled");
        self.present(&session).await;
        self.announce(NotifyTarget::Chat(chat_id), Notice::RegistrationCancelled { book_id })
            .await;
        Ok(session)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Key-addressed helpers used by the daily runs
    // ═══════════════════════════════════════════════════════════════════════

    /// Live sessions of a chat, oldest booking first.
    pub async fn live_sessions(
        &self,
        chat_id: ChatId,
    ) -> Result<Vec<RegistrationSession>, SessionError> {
        Ok(self.sessions.list_by_chat(chat_id).await?)
    }

    /// Ends a session addressed by key. Sends tokens but no chat notice;
    /// the caller decides how to announce it.
    pub async fn end_session(
        &self,
        chat_id: ChatId,
        session_id: SessionId,
    ) -> Result<EndedSession, SessionError> {
        let _guard = self.session_locks.lock(session_id).await;

        let mut session = self.fetch(chat_id, session_id).await?;
        let riders = session.end()?;
        self.ledger
            .record_final(session.book_id(), riders.len() as u32)
            .await
            .map_err(|e| SessionError::infrastructure(e.to_string()))?;
        self.sessions.remove(chat_id, session_id).await?;

        tracing::info!(
            book_id = %session.book_id(),
            riders = riders.len(),
            "Registration ended"
        );
        self.present(&session).await;
        let tokens = self.send_tokens(&session, &riders).await;
        Ok(EndedSession { session, tokens })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Chat migration
    // ═══════════════════════════════════════════════════════════════════════

    /// Moves a chat's live sessions and ridership rows to its new id.
    ///
    /// Holds both chat locks, then the lock of every session being moved,
    /// so no join or leave interleaves with the re-key.
    pub async fn migrate_chat(
        &self,
        from: ChatId,
        to: ChatId,
    ) -> Result<ChatRekey, SessionError> {
        let (first, second) = if from < to { (from, to) } else { (to, from) };
        let _first = self.chat_locks.lock(first).await;
        let _second = self.chat_locks.lock(second).await;

        let mut session_ids: Vec<SessionId> = self
            .sessions
            .list_by_chat(from)
            .await?
            .iter()
            .map(RegistrationSession::id)
            .collect();
        session_ids.sort_by_key(|id| *id.as_uuid());
        let mut guards = Vec::with_capacity(session_ids.len());
        for session_id in session_ids {
            guards.push(self.session_locks.lock(session_id).await);
        }

        let sessions = self.sessions.rekey_chat(from, to).await?;
        let ridership_rows = self.ledger.rekey_chat(from, to).await?;

        tracing::info!(
            from = %from,
            to = %to,
            sessions,
            ridership_rows,
            "Chat bookings moved"
        );
        Ok(ChatRekey {
            sessions,
            ridership_rows,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    async fn fetch(
        &self,
        chat_id: ChatId,
        session_id: SessionId,
    ) -> Result<RegistrationSession, SessionError> {
        self.sessions
            .get(chat_id, session_id)
            .await?
            .ok_or(SessionError::UnknownSession)
    }

    async fn locate(&self, book_id: BookId) -> Result<(ChatId, SessionId), SessionError> {
        let session = self
            .sessions
            .find_by_book_id(book_id)
            .await?
            .ok_or(SessionError::UnknownSession)?;
        Ok((session.chat_id(), session.id()))
    }

    async fn ensure_no_other_booking(
        &self,
        chat_id: ChatId,
        session_id: SessionId,
        rider_id: RiderId,
    ) -> Result<(), SessionError> {
        let elsewhere = self
            .sessions
            .list_by_chat(chat_id)
            .await?
            .iter()
            .any(|s| s.id() != session_id && s.has_rider(rider_id));
        if elsewhere {
            tracing::debug!(chat_id = %chat_id, rider_id = %rider_id, "Join rejected: booked elsewhere in chat");
            return Err(SessionError::AlreadyJoined(rider_id));
        }
        Ok(())
    }

    async fn send_tokens(&self, session: &RegistrationSession, riders: &[Rider]) -> TokenReport {
        let mut report = TokenReport::default();
        if riders.is_empty() {
            return report;
        }

        let chat = match self.directory.get(session.chat_id()).await {
            Ok(Some(chat)) => chat,
            Ok(None) => {
                tracing::warn!(chat_id = %session.chat_id(), "No chat settings; tokens not sent");
                report.failed = riders.len();
                return report;
            }
            Err(e) => {
                tracing::warn!("Failed to load chat settings for tokens: {}", e);
                report.failed = riders.len();
                return report;
            }
        };

        for rider in riders {
            let token = Notice::BookingConfirmed {
                book_id: session.book_id(),
                pickup: chat.pickup.clone(),
                destination: chat.destination.clone(),
                date: session.date(),
                time_slot: session.time_slot().to_string(),
            };
            match self.announce(NotifyTarget::Rider(rider.id()), token).await {
                Delivery::Delivered => report.delivered += 1,
                Delivery::Failed(_) => report.failed += 1,
            }
        }
        report
    }

    async fn present(&self, session: &RegistrationSession) {
        if let Delivery::Failed(reason) = self.renderer.render(session).await {
            tracing::warn!(book_id = %session.book_id(), "Failed to render session: {}", reason);
        }
    }

    async fn announce(&self, target: NotifyTarget, notice: Notice) -> Delivery {
        let delivery = self.notifier.notify(target, &notice).await;
        if let Delivery::Failed(reason) = &delivery {
            tracing::warn!(?target, "Failed to deliver notice: {}", reason);
        }
        delivery
    }
}
