//! OverrideScheduleHandler - applies admin-entered overrides to one bus.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::application::IntervalStore;
use crate::domain::foundation::BusId;
use crate::domain::schedule::{OverrideStatus, ScheduleError, ScheduleOverride};

/// One inclusive date range as entered; `end` defaults to `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: None,
        }
    }

    pub fn span(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn end(&self) -> NaiveDate {
        self.end.unwrap_or(self.start)
    }
}

/// Command to force one bus to run or not run over several ranges.
#[derive(Debug, Clone)]
pub struct OverrideScheduleCommand {
    pub bus_id: BusId,
    pub ranges: Vec<DateRange>,
    pub status: OverrideStatus,
}

/// The bus's canonical set after the override.
#[derive(Debug, Clone, Serialize)]
pub struct OverrideScheduleResult {
    pub bus_id: BusId,
    pub schedule: Vec<ScheduleOverride>,
}

pub struct OverrideScheduleHandler {
    intervals: Arc<IntervalStore>,
}

impl OverrideScheduleHandler {
    pub fn new(intervals: Arc<IntervalStore>) -> Self {
        Self { intervals }
    }

    /// Validates every range, then reconciles them in the order given.
    ///
    /// # Errors
    ///
    /// - `InvalidRange` if any range ends before it starts; nothing is applied
    /// - `UnknownBus` if the bus is not configured
    pub async fn handle(
        &self,
        cmd: OverrideScheduleCommand,
        today: NaiveDate,
    ) -> Result<OverrideScheduleResult, ScheduleError> {
        let insertions = cmd
            .ranges
            .iter()
            .map(|r| ScheduleOverride::new(cmd.bus_id, r.start, r.end(), cmd.status))
            .collect::<Result<Vec<_>, _>>()?;

        let schedule = self.intervals.apply(cmd.bus_id, &insertions, today).await?;
        Ok(OverrideScheduleResult {
            bus_id: cmd.bus_id,
            schedule,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryChatDirectory, InMemoryScheduleRepository};
    use crate::domain::chat::{Bus, ChatConfig, ChatType};
    use crate::domain::foundation::ChatId;
    use crate::ports::ScheduleRepository;

    const BUS: BusId = BusId::new(4);

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    async fn handler() -> (OverrideScheduleHandler, Arc<InMemoryScheduleRepository>) {
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
        let repo = Arc::new(InMemoryScheduleRepository::new());
        let intervals = Arc::new(IntervalStore::new(repo.clone(), directory));
        (OverrideScheduleHandler::new(intervals), repo)
    }

    #[tokio::test]
    async fn several_ranges_are_applied_together() {
        let (handler, _) = handler().await;
        let result = handler
            .handle(
                OverrideScheduleCommand {
                    bus_id: BUS,
                    ranges: vec![
                        DateRange::span(jan(10), jan(12)),
                        DateRange::day(jan(13)),
                        DateRange::day(jan(20)),
                    ],
                    status: OverrideStatus::Cancel,
                },
                jan(1),
            )
            .await
            .unwrap();

        assert_eq!(
            result.schedule,
            vec![
                ScheduleOverride::new(BUS, jan(10), jan(13), OverrideStatus::Cancel).unwrap(),
                ScheduleOverride::single_day(BUS, jan(20), OverrideStatus::Cancel),
            ]
        );
    }

    #[tokio::test]
    async fn one_bad_range_rejects_the_whole_command() {
        let (handler, repo) = handler().await;
        let err = handler
            .handle(
                OverrideScheduleCommand {
                    bus_id: BUS,
                    ranges: vec![DateRange::day(jan(10)), DateRange::span(jan(15), jan(12))],
                    status: OverrideStatus::Cancel,
                },
                jan(1),
            )
            .await
            .unwrap_err();

        assert_eq!(err, ScheduleError::invalid_range(jan(15), jan(12)));
        assert!(repo.load(BUS).await.unwrap().is_empty());
    }
}
