//! In-memory adapters for every storage port.
//!
//! Used by tests and when the binary runs without a database.

mod chat_directory;
mod ridership_ledger;
mod schedule_repository;
mod session_store;

pub use chat_directory::InMemoryChatDirectory;
pub use ridership_ledger::InMemoryRidershipLedger;
pub use schedule_repository::InMemoryScheduleRepository;
pub use session_store::InMemorySessionStore;
