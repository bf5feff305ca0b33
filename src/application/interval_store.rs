//! IntervalStore - the only entry point for reading and changing overrides.
//!
//! Wraps the schedule repository with the reconciler. Every
//! read-reconcile-write runs under a per-bus lock so concurrent overrides
//! for one bus never lose an update.

use chrono::NaiveDate;
use std::sync::Arc;

use super::KeyedLocks;
use crate::domain::foundation::BusId;
use crate::domain::schedule::{
    reconcile_for_bus, status_on, OverrideStatus, ScheduleError, ScheduleOverride,
};
use crate::ports::{ChatDirectory, ScheduleRepository};

pub struct IntervalStore {
    repository: Arc<dyn ScheduleRepository>,
    directory: Arc<dyn ChatDirectory>,
    bus_locks: KeyedLocks<BusId>,
}

impl IntervalStore {
    pub fn new(repository: Arc<dyn ScheduleRepository>, directory: Arc<dyn ChatDirectory>) -> Self {
        Self {
            repository,
            directory,
            bus_locks: KeyedLocks::new(),
        }
    }

    /// The stored set for a bus, as persisted.
    pub async fn load(&self, bus_id: BusId) -> Result<Vec<ScheduleOverride>, ScheduleError> {
        Ok(self.repository.load(bus_id).await?)
    }

    /// Replace the stored set for a bus.
    pub async fn save(
        &self,
        bus_id: BusId,
        overrides: &[ScheduleOverride],
    ) -> Result<(), ScheduleError> {
        let _guard = self.bus_locks.lock(bus_id).await;
        self.repository.save(bus_id, overrides).await?;
        Ok(())
    }

    /// Override status covering `date`; `None` means the weekday rule applies.
    pub async fn lookup_status(
        &self,
        bus_id: BusId,
        date: NaiveDate,
    ) -> Result<Option<OverrideStatus>, ScheduleError> {
        let overrides = self.repository.load(bus_id).await?;
        Ok(status_on(&overrides, date))
    }

    /// Current set for a configured bus.
    ///
    /// # Errors
    ///
    /// - `UnknownBus` if no chat has this bus
    pub async fn view(&self, bus_id: BusId) -> Result<Vec<ScheduleOverride>, ScheduleError> {
        self.ensure_known(bus_id).await?;
        self.load(bus_id).await
    }

    /// Folds `insertions` into a configured bus's set and stores the result.
    ///
    /// # Errors
    ///
    /// - `UnknownBus` if no chat has this bus
    /// - `InvalidRange` / `Overlap` from reconciliation; nothing is stored
    pub async fn apply(
        &self,
        bus_id: BusId,
        insertions: &[ScheduleOverride],
        today: NaiveDate,
    ) -> Result<Vec<ScheduleOverride>, ScheduleError> {
        self.ensure_known(bus_id).await?;
        let canonical = self.reconcile_and_store(bus_id, insertions, today).await?;
        tracing::info!(
            bus_id = %bus_id,
            inserted = insertions.len(),
            ranges = canonical.len(),
            "Schedule overrides applied"
        );
        Ok(canonical)
    }

    /// Applies one batch of insertions to several buses as a unit.
    ///
    /// Every bus is checked and reconciled before anything is written. If a
    /// later write fails, buses already written get their previous set back
    /// before the error is returned. Bus locks are taken in id order and held
    /// until the end.
    ///
    /// # Errors
    ///
    /// - `UnknownBus` if any bus is not configured; nothing is stored
    /// - `InvalidRange` / `Overlap` from reconciliation; nothing is stored
    pub async fn apply_all(
        &self,
        insertions: &[ScheduleOverride],
        today: NaiveDate,
    ) -> Result<Vec<BusId>, ScheduleError> {
        let mut buses: Vec<BusId> = insertions.iter().map(ScheduleOverride::bus_id).collect();
        buses.sort();
        buses.dedup();
        for bus_id in &buses {
            self.ensure_known(*bus_id).await?;
        }

        let mut guards = Vec::with_capacity(buses.len());
        for bus_id in &buses {
            guards.push(self.bus_locks.lock(*bus_id).await);
        }

        let mut pending = Vec::with_capacity(buses.len());
        for bus_id in &buses {
            let existing = self.repository.load(*bus_id).await?;
            let own: Vec<ScheduleOverride> = insertions
                .iter()
                .filter(|o| o.bus_id() == *bus_id)
                .copied()
                .collect();
            let canonical = reconcile_for_bus(*bus_id, &existing, &own, today)?;
            if canonical != existing {
                pending.push((*bus_id, existing, canonical));
            }
        }

        for (written, (bus_id, _, canonical)) in pending.iter().enumerate() {
            if let Err(e) = self.repository.save(*bus_id, canonical).await {
                for (restored, previous, _) in &pending[..written] {
                    if let Err(undo) = self.repository.save(*restored, previous).await {
                        tracing::error!(bus_id = %restored, "Failed to restore schedule: {}", undo);
                    }
                }
                return Err(e.into());
            }
        }

        tracing::info!(
            buses = buses.len(),
            inserted = insertions.len(),
            "Schedule overrides applied"
        );
        Ok(buses)
    }

    /// Drops ranges that ended before `today`. Returns how many were removed.
    pub async fn purge_expired(&self, bus_id: BusId, today: NaiveDate) -> Result<usize, ScheduleError> {
        let _guard = self.bus_locks.lock(bus_id).await;
        let existing = self.repository.load(bus_id).await?;
        let canonical = reconcile_for_bus(bus_id, &existing, &[], today)?;
        if canonical != existing {
            self.repository.save(bus_id, &canonical).await?;
        }
        Ok(existing.len().saturating_sub(canonical.len()))
    }

    async fn reconcile_and_store(
        &self,
        bus_id: BusId,
        insertions: &[ScheduleOverride],
        today: NaiveDate,
    ) -> Result<Vec<ScheduleOverride>, ScheduleError> {
        let _guard = self.bus_locks.lock(bus_id).await;
        let existing = self.repository.load(bus_id).await?;
        let canonical = reconcile_for_bus(bus_id, &existing, insertions, today)?;
        if canonical != existing {
            self.repository.save(bus_id, &canonical).await?;
        }
        Ok(canonical)
    }

    async fn ensure_known(&self, bus_id: BusId) -> Result<(), ScheduleError> {
        match self.directory.find_bus(bus_id).await? {
            Some(_) => Ok(()),
            None => Err(ScheduleError::UnknownBus(bus_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryChatDirectory, InMemoryScheduleRepository};
    use crate::domain::chat::{Bus, ChatConfig, ChatType};
    use crate::domain::foundation::{ChatId, DomainError};
    use async_trait::async_trait;

    const BUS: BusId = BusId::new(1);

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn range(from: u32, to: u32, status: OverrideStatus) -> ScheduleOverride {
        ScheduleOverride::new(BUS, jan(from), jan(to), status).unwrap()
    }

    async fn directory_with_bus() -> Arc<InMemoryChatDirectory> {
        let directory = Arc::new(InMemoryChatDirectory::new());
        directory
            .register(ChatConfig {
                chat_id: ChatId::new(-1),
                chat_type: ChatType::Service,
                max_riders: 40,
                pickup: "Camp".to_string(),
                destination: "Station".to_string(),
                buses: vec![Bus {
                    bus_id: BUS,
                    chat_id: ChatId::new(-1),
                    time: "0630".to_string(),
                }],
            })
            .await;
        directory
    }

    async fn store() -> (IntervalStore, Arc<InMemoryScheduleRepository>) {
        let repo = Arc::new(InMemoryScheduleRepository::new());
        let store = IntervalStore::new(repo.clone(), directory_with_bus().await);
        (store, repo)
    }

    struct FailingRepository;

    #[async_trait]
    impl ScheduleRepository for FailingRepository {
        async fn load(&self, _bus_id: BusId) -> Result<Vec<ScheduleOverride>, DomainError> {
            Ok(vec![])
        }

        async fn save(
            &self,
            _bus_id: BusId,
            _overrides: &[ScheduleOverride],
        ) -> Result<(), DomainError> {
            Err(DomainError::database("disk full"))
        }
    }

    #[tokio::test]
    async fn apply_persists_the_canonical_set() {
        let (store, repo) = store().await;
        store
            .apply(BUS, &[range(10, 15, OverrideStatus::Cancel)], jan(1))
            .await
            .unwrap();
        let result = store
            .apply(BUS, &[range(12, 13, OverrideStatus::Run)], jan(1))
            .await
            .unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(repo.load(BUS).await.unwrap(), result);
    }

    #[tokio::test]
    async fn lookup_status_finds_covering_range() {
        let (store, _) = store().await;
        store
            .apply(BUS, &[range(10, 15, OverrideStatus::Cancel)], jan(1))
            .await
            .unwrap();

        assert_eq!(
            store.lookup_status(BUS, jan(12)).await.unwrap(),
            Some(OverrideStatus::Cancel)
        );
        assert_eq!(store.lookup_status(BUS, jan(16)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn unknown_bus_is_rejected() {
        let (store, _) = store().await;
        let err = store
            .apply(BusId::new(99), &[], jan(1))
            .await
            .unwrap_err();
        assert_eq!(err, ScheduleError::UnknownBus(BusId::new(99)));
        assert!(store.view(BusId::new(99)).await.is_err());
    }

    #[tokio::test]
    async fn purge_expired_removes_past_ranges() {
        let (store, repo) = store().await;
        repo.seed(
            BUS,
            vec![
                range(2, 3, OverrideStatus::Cancel),
                range(20, 21, OverrideStatus::Run),
            ],
        )
        .await;

        let removed = store.purge_expired(BUS, jan(10)).await.unwrap();

        assert_eq!(removed, 1);
        assert_eq!(
            repo.load(BUS).await.unwrap(),
            vec![range(20, 21, OverrideStatus::Run)]
        );
    }

    /// Stores in memory but refuses to save one bus.
    struct RefusesBus {
        inner: InMemoryScheduleRepository,
        refused: BusId,
    }

    #[async_trait]
    impl ScheduleRepository for RefusesBus {
        async fn load(&self, bus_id: BusId) -> Result<Vec<ScheduleOverride>, DomainError> {
            self.inner.load(bus_id).await
        }

        async fn save(
            &self,
            bus_id: BusId,
            overrides: &[ScheduleOverride],
        ) -> Result<(), DomainError> {
            if bus_id == self.refused {
                return Err(DomainError::database("disk full"));
            }
            self.inner.save(bus_id, overrides).await
        }
    }

    async fn directory_with_buses(buses: &[BusId]) -> Arc<InMemoryChatDirectory> {
        let directory = Arc::new(InMemoryChatDirectory::new());
        directory
            .register(ChatConfig {
                chat_id: ChatId::new(-1),
                chat_type: ChatType::Service,
                max_riders: 40,
                pickup: "Camp".to_string(),
                destination: "Station".to_string(),
                buses: buses
                    .iter()
                    .map(|bus_id| Bus {
                        bus_id: *bus_id,
                        chat_id: ChatId::new(-1),
                        time: "0630".to_string(),
                    })
                    .collect(),
            })
            .await;
        directory
    }

    #[tokio::test]
    async fn apply_all_writes_every_bus() {
        let (a, b) = (BusId::new(1), BusId::new(2));
        let repo = Arc::new(InMemoryScheduleRepository::new());
        let store = IntervalStore::new(repo.clone(), directory_with_buses(&[a, b]).await);

        let applied = store
            .apply_all(
                &[
                    ScheduleOverride::single_day(b, jan(14), OverrideStatus::Cancel),
                    ScheduleOverride::single_day(a, jan(14), OverrideStatus::Cancel),
                ],
                jan(13),
            )
            .await
            .unwrap();

        assert_eq!(applied, vec![a, b]);
        for bus in [a, b] {
            assert_eq!(
                store.lookup_status(bus, jan(14)).await.unwrap(),
                Some(OverrideStatus::Cancel)
            );
        }
    }

    #[tokio::test]
    async fn apply_all_with_an_unknown_bus_writes_nothing() {
        let known = BusId::new(1);
        let repo = Arc::new(InMemoryScheduleRepository::new());
        let store = IntervalStore::new(repo.clone(), directory_with_buses(&[known]).await);

        let err = store
            .apply_all(
                &[
                    ScheduleOverride::single_day(known, jan(14), OverrideStatus::Cancel),
                    ScheduleOverride::single_day(BusId::new(7), jan(14), OverrideStatus::Cancel),
                ],
                jan(13),
            )
            .await
            .unwrap_err();

        assert_eq!(err, ScheduleError::UnknownBus(BusId::new(7)));
        assert!(repo.load(known).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn apply_all_restores_earlier_buses_when_a_write_fails() {
        let (a, b) = (BusId::new(1), BusId::new(2));
        let inner = InMemoryScheduleRepository::new();
        let before = vec![ScheduleOverride::new(a, jan(10), jan(20), OverrideStatus::Run).unwrap()];
        inner.seed(a, before.clone()).await;
        let store = IntervalStore::new(
            Arc::new(RefusesBus {
                inner: inner.clone(),
                refused: b,
            }),
            directory_with_buses(&[a, b]).await,
        );

        let err = store
            .apply_all(
                &[
                    ScheduleOverride::single_day(a, jan(14), OverrideStatus::Cancel),
                    ScheduleOverride::single_day(b, jan(14), OverrideStatus::Cancel),
                ],
                jan(13),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ScheduleError::Infrastructure(_)));
        assert_eq!(inner.load(a).await.unwrap(), before);
        assert!(inner.load(b).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_infrastructure() {
        let store = IntervalStore::new(Arc::new(FailingRepository), directory_with_bus().await);
        let err = store
            .apply(BUS, &[range(10, 15, OverrideStatus::Cancel)], jan(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ScheduleError::Infrastructure(_)));
    }
}
