//! In-memory schedule repository.
//!
//! Keeps each bus's override set in a map. Useful for tests and for
//! running without a database.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{BusId, DomainError};
use crate::domain::schedule::ScheduleOverride;
use crate::ports::ScheduleRepository;

#[derive(Debug, Clone, Default)]
pub struct InMemoryScheduleRepository {
    sets: Arc<RwLock<HashMap<BusId, Vec<ScheduleOverride>>>>,
}

impl InMemoryScheduleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a bus with a set as-is, bypassing reconciliation.
    pub async fn seed(&self, bus_id: BusId, overrides: Vec<ScheduleOverride>) {
        self.sets.write().await.insert(bus_id, overrides);
    }
}

#[async_trait]
impl ScheduleRepository for InMemoryScheduleRepository {
    async fn load(&self, bus_id: BusId) -> Result<Vec<ScheduleOverride>, DomainError> {
        Ok(self
            .sets
            .read()
            .await
            .get(&bus_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save(&self, bus_id: BusId, overrides: &[ScheduleOverride]) -> Result<(), DomainError> {
        let mut sets = self.sets.write().await;
        if overrides.is_empty() {
            sets.remove(&bus_id);
        } else {
            sets.insert(bus_id, overrides.to_vec());
        }
        Ok(())
    }
}
