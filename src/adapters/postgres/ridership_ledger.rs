//! PostgreSQL implementation of RidershipLedger.
//!
//! Booking ids come from `ridership_book_id_seq`, so they stay monotonic
//! across restarts and processes.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

use super::db_error;
use crate::domain::foundation::{BookId, ChatId, DomainError, ErrorCode};
use crate::ports::{DailyRidership, RidershipEntry, RidershipLedger};

#[derive(Clone)]
pub struct PostgresRidershipLedger {
    pool: PgPool,
}

impl PostgresRidershipLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RidershipLedger for PostgresRidershipLedger {
    async fn next_book_id(&self) -> Result<BookId, DomainError> {
        let (id,): (i64,) = sqlx::query_as("SELECT nextval('ridership_book_id_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("allocate booking id", e))?;
        Ok(BookId::new(id))
    }

    async fn record_opened(&self, entry: &RidershipEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO ridership (book_id, chat_id, date, time, riders)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.book_id.value())
        .bind(entry.chat_id.value())
        .bind(entry.date)
        .bind(&entry.time)
        .bind(entry.riders as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert ridership", e))?;

        Ok(())
    }

    async fn record_final(&self, book_id: BookId, riders: u32) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE ridership SET riders = $2 WHERE book_id = $1")
            .bind(book_id.value())
            .bind(riders as i32)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("update ridership", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SessionNotFound,
                format!("No ridership row for booking {}", book_id),
            ));
        }

        Ok(())
    }

    async fn remove(&self, book_id: BookId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM ridership WHERE book_id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete ridership", e))?;

        Ok(())
    }

    async fn daily_totals(&self, chat_id: ChatId) -> Result<Vec<DailyRidership>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT date, SUM(riders)::BIGINT AS riders
            FROM ridership
            WHERE chat_id = $1
            GROUP BY date
            ORDER BY date
            "#,
        )
        .bind(chat_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("sum ridership", e))?;

        Ok(rows
            .into_iter()
            .map(|row| DailyRidership {
                date: row.get::<NaiveDate, _>("date"),
                riders: riders_from_total(row.get::<i64, _>("riders")),
            })
            .collect())
    }

    async fn rekey_chat(&self, from: ChatId, to: ChatId) -> Result<usize, DomainError> {
        let result = sqlx::query("UPDATE ridership SET chat_id = $2 WHERE chat_id = $1")
            .bind(from.value())
            .bind(to.value())
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("move ridership to new chat", e))?;

        Ok(result.rows_affected() as usize)
    }
}

/// `SUM` over `INTEGER` comes back as `BIGINT`; saturate rather than wrap.
fn riders_from_total(total: i64) -> u32 {
    u32::try_from(total.max(0)).unwrap_or(u32::MAX)
}
