//! Schedule repository port.
//!
//! Persists each bus's canonical override set. Implementations store and
//! return whole sets; reconciliation happens in the application layer.

use async_trait::async_trait;

use crate::domain::foundation::{BusId, DomainError};
use crate::domain::schedule::ScheduleOverride;

/// Repository port for per-bus override sets.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    /// Load every stored override for a bus, in storage order.
    async fn load(&self, bus_id: BusId) -> Result<Vec<ScheduleOverride>, DomainError>;

    /// Replace the stored set for a bus.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure; the previous set is kept
    async fn save(&self, bus_id: BusId, overrides: &[ScheduleOverride]) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn ScheduleRepository) {}
    }
}
