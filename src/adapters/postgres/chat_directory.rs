//! PostgreSQL implementation of ChatDirectory.
//!
//! Reads `settings` and `buses`. A chat stored without a rider limit
//! falls back to the configured default. Writes only when a chat migrates.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use super::db_error;
use crate::domain::chat::{Bus, ChatConfig, ChatType};
use crate::domain::foundation::{BusId, ChatId, DomainError, ErrorCode};
use crate::ports::ChatDirectory;

#[derive(Clone)]
pub struct PostgresChatDirectory {
    pool: PgPool,
    default_max_riders: u32,
}

impl PostgresChatDirectory {
    pub fn new(pool: PgPool, default_max_riders: u32) -> Self {
        Self {
            pool,
            default_max_riders,
        }
    }

    fn row_to_chat(&self, row: &PgRow) -> Result<ChatConfig, DomainError> {
        let chat_id = ChatId::new(row.get("chat_id"));
        let raw_type: String = row.get("chat_type");
        let chat_type = ChatType::parse(&raw_type).ok_or_else(|| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Unknown chat type '{}' for chat {}", raw_type, chat_id),
            )
        })?;
        let max_riders = resolve_max_riders(row.get("max_riders"), self.default_max_riders);

        Ok(ChatConfig {
            chat_id,
            chat_type,
            max_riders,
            pickup: row.get("pickup"),
            destination: row.get("destination"),
            buses: Vec::new(),
        })
    }

    async fn buses_of(&self, chat_id: ChatId) -> Result<Vec<Bus>, DomainError> {
        let rows = sqlx::query("SELECT bus_id, chat_id, time FROM buses WHERE chat_id = $1 ORDER BY bus_id")
            .bind(chat_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("load buses", e))?;

        Ok(rows.iter().map(row_to_bus).collect())
    }
}

/// A missing or non-positive stored limit means "use the default".
fn resolve_max_riders(stored: Option<i32>, default: u32) -> u32 {
    stored
        .and_then(|n| u32::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

fn row_to_bus(row: &PgRow) -> Bus {
    Bus {
        bus_id: BusId::new(row.get("bus_id")),
        chat_id: ChatId::new(row.get("chat_id")),
        time: row.get("time"),
    }
}

const SELECT_SETTINGS: &str =
    "SELECT chat_id, chat_type, max_riders, pickup, destination FROM settings";

#[async_trait]
impl ChatDirectory for PostgresChatDirectory {
    async fn get(&self, chat_id: ChatId) -> Result<Option<ChatConfig>, DomainError> {
        let row = sqlx::query(&format!("{} WHERE chat_id = $1", SELECT_SETTINGS))
            .bind(chat_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("load chat settings", e))?;

        match row {
            Some(row) => {
                let mut chat = self.row_to_chat(&row)?;
                chat.buses = self.buses_of(chat_id).await?;
                Ok(Some(chat))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<ChatConfig>, DomainError> {
        let rows = sqlx::query(&format!("{} ORDER BY chat_id", SELECT_SETTINGS))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list chat settings", e))?;

        let bus_rows = sqlx::query("SELECT bus_id, chat_id, time FROM buses ORDER BY bus_id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("list buses", e))?;
        let buses: Vec<Bus> = bus_rows.iter().map(row_to_bus).collect();

        rows.iter()
            .map(|row| {
                let mut chat = self.row_to_chat(row)?;
                chat.buses = buses
                    .iter()
                    .filter(|b| b.chat_id == chat.chat_id)
                    .cloned()
                    .collect();
                Ok(chat)
            })
            .collect()
    }

    async fn find_bus(&self, bus_id: BusId) -> Result<Option<Bus>, DomainError> {
        let row = sqlx::query("SELECT bus_id, chat_id, time FROM buses WHERE bus_id = $1")
            .bind(bus_id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("find bus", e))?;

        Ok(row.as_ref().map(row_to_bus))
    }

    /// `buses` references `settings`, so the new settings row goes in
    /// first and the old one is dropped last, all in one transaction.
    async fn rekey_chat(&self, from: ChatId, to: ChatId) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("begin chat migration", e))?;

        let copied = sqlx::query(
            r#"
            INSERT INTO settings (chat_id, chat_type, max_riders, pickup, destination)
            SELECT $2, chat_type, max_riders, pickup, destination
            FROM settings WHERE chat_id = $1
            "#,
        )
        .bind(from.value())
        .bind(to.value())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("copy chat settings", e))?;

        if copied.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::ChatNotFound, "Chat has not been set up")
                .with_detail("chat_id", from.to_string()));
        }

        sqlx::query("UPDATE buses SET chat_id = $2 WHERE chat_id = $1")
            .bind(from.value())
            .bind(to.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("move buses", e))?;

        sqlx::query("DELETE FROM settings WHERE chat_id = $1")
            .bind(from.value())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("drop old chat settings", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("commit chat migration", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_limit_wins_when_positive() {
        assert_eq!(resolve_max_riders(Some(12), 40), 12);
    }

    #[test]
    fn missing_or_non_positive_limit_uses_default() {
        assert_eq!(resolve_max_riders(None, 40), 40);
        assert_eq!(resolve_max_riders(Some(0), 40), 40);
        assert_eq!(resolve_max_riders(Some(-3), 40), 40);
    }
}
