//! PostgreSQL adapters - sqlx implementations of the storage ports.
//!
//! - `PostgresScheduleRepository` - per-bus override sets in `schedule`
//! - `PostgresSessionStore` - live sessions as JSONB documents
//! - `PostgresRidershipLedger` - `ridership` rows and booking ids
//! - `PostgresChatDirectory` - `settings` joined with `buses`

mod chat_directory;
mod ridership_ledger;
mod schedule_repository;
mod session_store;

pub use chat_directory::PostgresChatDirectory;
pub use ridership_ledger::PostgresRidershipLedger;
pub use schedule_repository::PostgresScheduleRepository;
pub use session_store::PostgresSessionStore;

use crate::domain::foundation::DomainError;

/// Applies the bundled migrations.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), DomainError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to run migrations: {}", e)))
}

fn db_error(action: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("Failed to {}: {}", action, err))
}
