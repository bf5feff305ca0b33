//! Booking rules

use serde::Deserialize;

use super::error::ValidationError;
use crate::application::BookingPolicy;

/// Booking configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BookingConfig {
    /// Capacity for chats registered without an explicit limit
    #[serde(default = "default_max_riders")]
    pub default_max_riders: u32,

    /// A rider may hold a place in only one live session of a chat
    #[serde(default = "default_one_booking_per_chat")]
    pub one_booking_per_chat: bool,

    /// JSON list of chat settings seeded into the in-memory directory
    #[serde(default)]
    pub chats_file: Option<String>,
}

impl BookingConfig {
    pub fn policy(&self) -> BookingPolicy {
        BookingPolicy {
            one_booking_per_chat: self.one_booking_per_chat,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_max_riders == 0 {
            return Err(ValidationError::InvalidMaxRiders);
        }
        Ok(())
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_max_riders: default_max_riders(),
            one_booking_per_chat: default_one_booking_per_chat(),
            chats_file: None,
        }
    }
}

fn default_max_riders() -> u32 {
    40
}

fn default_one_booking_per_chat() -> bool {
    true
}
