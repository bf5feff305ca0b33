//! Chat configuration value types.
//!
//! Chat settings are owned by the chat directory collaborator; the core
//! only reads them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{BusId, ChatId};

/// Role a chat plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChatType {
    /// Administrators manage bookings and schedules for every service.
    Admin,
    /// Riders register for one service's buses.
    #[default]
    Service,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Admin => "admin",
            ChatType::Service => "service",
        }
    }

    /// Parses the stored form, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" => Some(ChatType::Admin),
            "service" => Some(ChatType::Service),
            _ => None,
        }
    }
}

impl fmt::Display for ChatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recurring bus timing of a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bus {
    pub bus_id: BusId,
    pub chat_id: ChatId,
    /// Departure time as entered, e.g. `0630`.
    pub time: String,
}

/// Settings of one chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    pub chat_id: ChatId,
    pub chat_type: ChatType,
    pub max_riders: u32,
    pub pickup: String,
    pub destination: String,
    pub buses: Vec<Bus>,
}

impl ChatConfig {
    pub fn is_admin(&self) -> bool {
        self.chat_type == ChatType::Admin
    }

    pub fn bus(&self, bus_id: BusId) -> Option<&Bus> {
        self.buses.iter().find(|b| b.bus_id == bus_id)
    }
}
