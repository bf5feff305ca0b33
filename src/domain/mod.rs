//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, lifecycle state)
//! - `schedule` - Per-bus override ranges and their reconciliation
//! - `session` - Registration session aggregate and roster rules
//! - `chat` - Read-only chat configuration types
//! - `notice` - Notices handed to the notification collaborator

pub mod chat;
pub mod foundation;
pub mod notice;
pub mod schedule;
pub mod session;
