//! In-memory ridership ledger.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{BookId, ChatId, DomainError, ErrorCode};
use crate::ports::{DailyRidership, RidershipEntry, RidershipLedger};

/// Ledger rows keyed by booking id, with an atomic id counter.
#[derive(Debug, Clone)]
pub struct InMemoryRidershipLedger {
    rows: Arc<RwLock<BTreeMap<BookId, RidershipEntry>>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryRidershipLedger {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Ledger whose first allocated booking id is `first`.
    pub fn starting_at(first: i64) -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(first)),
        }
    }

    /// Snapshot of a row, for inspection in tests.
    pub async fn entry(&self, book_id: BookId) -> Option<RidershipEntry> {
        self.rows.read().await.get(&book_id).cloned()
    }
}

impl Default for InMemoryRidershipLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RidershipLedger for InMemoryRidershipLedger {
    async fn next_book_id(&self) -> Result<BookId, DomainError> {
        Ok(BookId::new(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn record_opened(&self, entry: &RidershipEntry) -> Result<(), DomainError> {
        self.rows.write().await.insert(entry.book_id, entry.clone());
        Ok(())
    }

    async fn record_final(&self, book_id: BookId, riders: u32) -> Result<(), DomainError> {
        let mut rows = self.rows.write().await;
        let row = rows.get_mut(&book_id).ok_or_else(|| {
            DomainError::new(ErrorCode::SessionNotFound, "No ridership row for booking")
                .with_detail("book_id", book_id.to_string())
        })?;
        row.riders = riders;
        Ok(())
    }

    async fn remove(&self, book_id: BookId) -> Result<(), DomainError> {
        self.rows.write().await.remove(&book_id);
        Ok(())
    }

    async fn daily_totals(&self, chat_id: ChatId) -> Result<Vec<DailyRidership>, DomainError> {
        let mut totals: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for row in self.rows.read().await.values().filter(|r| r.chat_id == chat_id) {
            *totals.entry(row.date).or_default() += row.riders;
        }
        Ok(totals
            .into_iter()
            .map(|(date, riders)| DailyRidership { date, riders })
            .collect())
    }

    async fn rekey_chat(&self, from: ChatId, to: ChatId) -> Result<usize, DomainError> {
        let mut moved = 0;
        for row in self.rows.write().await.values_mut().filter(|r| r.chat_id == from) {
            row.chat_id = to;
            moved += 1;
        }
        Ok(moved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(book_id: i64, chat_id: i64, day: u32, riders: u32) -> RidershipEntry {
        RidershipEntry {
            book_id: BookId::new(book_id),
            chat_id: ChatId::new(chat_id),
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            time: "0630".to_string(),
            riders,
        }
    }

    #[tokio::test]
    async fn book_ids_are_monotonic() {
        let ledger = InMemoryRidershipLedger::starting_at(10);
        let a = ledger.next_book_id().await.unwrap();
        let b = ledger.next_book_id().await.unwrap();
        assert_eq!(a, BookId::new(10));
        assert!(b > a);
    }

    #[tokio::test]
    async fn daily_totals_sum_bookings_per_date() {
        let ledger = InMemoryRidershipLedger::new();
        ledger.record_opened(&row(1, -1, 13, 10)).await.unwrap();
        ledger.record_opened(&row(2, -1, 13, 5)).await.unwrap();
        ledger.record_opened(&row(3, -1, 14, 7)).await.unwrap();
        ledger.record_opened(&row(4, -2, 14, 99)).await.unwrap();

        let totals = ledger.daily_totals(ChatId::new(-1)).await.unwrap();
        let riders: Vec<u32> = totals.iter().map(|t| t.riders).collect();
        assert_eq!(riders, vec![15, 7]);
    }

    #[tokio::test]
    async fn record_final_requires_an_opened_row() {
        let ledger = InMemoryRidershipLedger::new();
        let err = ledger.record_final(BookId::new(1), 3).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionNotFound);

        ledger.record_opened(&row(1, -1, 13, 0)).await.unwrap();
        ledger.record_final(BookId::new(1), 3).await.unwrap();
        assert_eq!(ledger.entry(BookId::new(1)).await.unwrap().riders, 3);
    }

    #[tokio::test]
    async fn rekey_chat_moves_only_that_chats_rows() {
        let ledger = InMemoryRidershipLedger::new();
        ledger.record_opened(&row(1, -1, 13, 4)).await.unwrap();
        ledger.record_opened(&row(2, -2, 13, 6)).await.unwrap();

        let moved = ledger.rekey_chat(ChatId::new(-1), ChatId::new(-9)).await.unwrap();

        assert_eq!(moved, 1);
        assert!(ledger.daily_totals(ChatId::new(-1)).await.unwrap().is_empty());
        assert_eq!(ledger.daily_totals(ChatId::new(-9)).await.unwrap()[0].riders, 4);
        assert_eq!(ledger.daily_totals(ChatId::new(-2)).await.unwrap()[0].riders, 6);
    }
}
