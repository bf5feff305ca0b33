//! Ridership ledger port.
//!
//! One row per booking: opened with zero riders, finalized with the roster
//! size when the session ends, deleted when it is cancelled. Also the
//! source of monotonic booking ids.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BookId, ChatId, DomainError};

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RidershipEntry {
    pub book_id: BookId,
    pub chat_id: ChatId,
    pub date: NaiveDate,
    pub time: String,
    pub riders: u32,
}

/// Riders summed over every booking of one chat on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRidership {
    pub date: NaiveDate,
    pub riders: u32,
}

/// Ledger port for ridership records.
#[async_trait]
pub trait RidershipLedger: Send + Sync {
    /// Allocate the next booking id. Never returns the same id twice.
    async fn next_book_id(&self) -> Result<BookId, DomainError>;

    /// Record a freshly opened booking.
    async fn record_opened(&self, entry: &RidershipEntry) -> Result<(), DomainError>;

    /// Set the final rider count of a booking.
    ///
    /// # Errors
    ///
    /// - `SessionNotFound` if no row exists for the booking
    async fn record_final(&self, book_id: BookId, riders: u32) -> Result<(), DomainError>;

    /// Delete a booking's row. Deleting a missing row is not an error.
    async fn remove(&self, book_id: BookId) -> Result<(), DomainError>;

    /// Per-date rider totals for a chat, oldest date first.
    async fn daily_totals(&self, chat_id: ChatId) -> Result<Vec<DailyRidership>, DomainError>;

    /// Reassign every row of `from` to `to`. Returns how many rows moved.
    async fn rekey_chat(&self, from: ChatId, to: ChatId) -> Result<usize, DomainError>;
}
