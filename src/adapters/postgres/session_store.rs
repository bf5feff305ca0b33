//! PostgreSQL implementation of SessionStore.
//!
//! Each live session is one row; the aggregate itself is kept as a JSONB
//! document next to the columns it is looked up by.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};

use super::db_error;
use crate::domain::foundation::{BookId, ChatId, DomainError, ErrorCode, SessionId};
use crate::domain::session::RegistrationSession;
use crate::ports::SessionStore;

#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn encode(session: &RegistrationSession) -> Result<String, DomainError> {
    serde_json::to_string(session).map_err(|e| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Failed to encode session: {}", e),
        )
    })
}

fn row_to_session(row: PgRow) -> Result<RegistrationSession, DomainError> {
    decode(&row.get::<String, _>("payload"))
}

fn decode(payload: &str) -> Result<RegistrationSession, DomainError> {
    serde_json::from_str(payload).map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Corrupt session document: {}", e),
        )
    })
}

fn not_found(session_id: SessionId) -> DomainError {
    DomainError::new(ErrorCode::SessionNotFound, "Session not found")
        .with_detail("session_id", session_id.to_string())
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn insert(&self, session: &RegistrationSession) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO registration_sessions (session_id, book_id, chat_id, payload)
            VALUES ($1, $2, $3, $4::jsonb)
            "#,
        )
        .bind(session.id().as_uuid())
        .bind(session.book_id().value())
        .bind(session.chat_id().value())
        .bind(encode(session)?)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("insert session", e))?;

        Ok(())
    }

    async fn update(&self, session: &RegistrationSession) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE registration_sessions SET payload = $3::jsonb
            WHERE chat_id = $1 AND session_id = $2
            "#,
        )
        .bind(session.chat_id().value())
        .bind(session.id().as_uuid())
        .bind(encode(session)?)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("update session", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(session.id()));
        }
        Ok(())
    }

    async fn get(
        &self,
        chat_id: ChatId,
        session_id: SessionId,
    ) -> Result<Option<RegistrationSession>, DomainError> {
        sqlx::query(
            r#"
            SELECT payload::text AS payload FROM registration_sessions
            WHERE chat_id = $1 AND session_id = $2
            "#,
        )
        .bind(chat_id.value())
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch session", e))?
        .map(row_to_session)
        .transpose()
    }

    async fn find_by_book_id(
        &self,
        book_id: BookId,
    ) -> Result<Option<RegistrationSession>, DomainError> {
        sqlx::query(
            "SELECT payload::text AS payload FROM registration_sessions WHERE book_id = $1",
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch session by booking id", e))?
        .map(row_to_session)
        .transpose()
    }

    async fn list_by_chat(&self, chat_id: ChatId) -> Result<Vec<RegistrationSession>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT payload::text AS payload FROM registration_sessions
            WHERE chat_id = $1
            ORDER BY book_id
            "#,
        )
        .bind(chat_id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list sessions", e))?;

        rows.into_iter().map(row_to_session).collect()
    }

    async fn remove(&self, chat_id: ChatId, session_id: SessionId) -> Result<(), DomainError> {
        let result = sqlx::query(
            "DELETE FROM registration_sessions WHERE chat_id = $1 AND session_id = $2",
        )
        .bind(chat_id.value())
        .bind(session_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("delete session", e))?;

        if result.rows_affected() == 0 {
            return Err(not_found(session_id));
        }
        Ok(())
    }

    /// Rewrites the key column and the chat id inside each document together.
    async fn rekey_chat(&self, from: ChatId, to: ChatId) -> Result<usize, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE registration_sessions
            SET chat_id = $2,
                payload = jsonb_set(payload, '{chat_id}', to_jsonb($2::BIGINT))
            WHERE chat_id = $1
            "#,
        )
        .bind(from.value())
        .bind(to.value())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("move sessions to new chat", e))?;

        Ok(result.rows_affected() as usize)
    }
}
