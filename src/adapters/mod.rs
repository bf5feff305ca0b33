//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the core to external systems:
//! - `memory` - In-memory storage for tests and database-less runs
//! - `postgres` - sqlx-backed storage
//! - `notify` - Notice text plus log-backed and recording notifiers
//! - `http` - axum front end over the command dispatcher

pub mod http;
pub mod memory;
pub mod notify;
pub mod postgres;
