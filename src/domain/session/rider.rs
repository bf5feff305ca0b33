//! Rider value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::RiderId;

/// A chat user registered (or registering) for a bus.
///
/// Equality is by id only; display names can change between taps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rider {
    id: RiderId,
    display_name: String,
}

impl Rider {
    /// Creates a rider, falling back to the id when no name is known.
    pub fn new(id: RiderId, display_name: impl Into<String>) -> Self {
        let display_name = display_name.into();
        let display_name = if display_name.trim().is_empty() {
            id.to_string()
        } else {
            display_name
        };
        Self { id, display_name }
    }

    pub fn id(&self) -> RiderId {
        self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

impl PartialEq for Rider {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Rider {}
