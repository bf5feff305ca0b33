//! Chat-level handlers.

mod migrate_chat;

pub use migrate_chat::{MigrateChatCommand, MigrateChatHandler, MigrateChatResult};
