//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `ScheduleRepository` - Per-bus override sets
//! - `SessionStore` - Live registration sessions
//! - `RidershipLedger` - Booking ids and ridership rows
//!
//! ## Collaborator Ports
//!
//! - `ChatDirectory` - Chat settings and bus timings
//! - `Notifier` - Fire-and-forget notices
//! - `SessionRenderer` - Session message surface

mod chat_directory;
mod notifier;
mod ridership_ledger;
mod schedule_repository;
mod session_store;

pub use chat_directory::ChatDirectory;
pub use notifier::{Delivery, Notifier, SessionRenderer};
pub use ridership_ledger::{DailyRidership, RidershipEntry, RidershipLedger};
pub use schedule_repository::ScheduleRepository;
pub use session_store::SessionStore;
