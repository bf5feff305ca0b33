//! PostgreSQL implementation of ScheduleRepository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

use super::db_error;
use crate::domain::foundation::{BusId, DomainError, ErrorCode};
use crate::domain::schedule::{OverrideStatus, ScheduleOverride};
use crate::ports::ScheduleRepository;

#[derive(Clone)]
pub struct PostgresScheduleRepository {
    pool: PgPool,
}

impl PostgresScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PostgresScheduleRepository {
    async fn load(&self, bus_id: BusId) -> Result<Vec<ScheduleOverride>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT start_date, end_date, status
            FROM schedule
            WHERE bus_id = $1
            ORDER BY start_date
            "#,
        )
        .bind(bus_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("load schedule", e))?;

        rows.into_iter()
            .map(|row| {
                decode_override(
                    bus_id,
                    row.get("start_date"),
                    row.get("end_date"),
                    row.get("status"),
                )
            })
            .collect()
    }

    /// Replaces the whole set in one transaction.
    async fn save(&self, bus_id: BusId, overrides: &[ScheduleOverride]) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin schedule transaction", e))?;

        sqlx::query("DELETE FROM schedule WHERE bus_id = $1")
            .bind(bus_id.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("clear schedule", e))?;

        for entry in overrides {
            sqlx::query(
                r#"
                INSERT INTO schedule (bus_id, start_date, end_date, status)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(bus_id.value())
            .bind(entry.start_date())
            .bind(entry.end_date())
            .bind(entry.status().code())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("insert schedule override", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("commit schedule", e))
    }
}

fn decode_override(
    bus_id: BusId,
    start: NaiveDate,
    end: NaiveDate,
    code: i16,
) -> Result<ScheduleOverride, DomainError> {
    let status = OverrideStatus::from_code(code)
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))?;
    ScheduleOverride::new(bus_id, start, end, status)
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, e.to_string()))
}
