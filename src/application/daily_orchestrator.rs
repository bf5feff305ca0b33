//! DailyOrchestrator - the two timer-driven runs.
//!
//! `run_daily` opens tomorrow's sessions bus by bus, consulting overrides
//! first and the weekday rule second, then purges expired overrides.
//! `end_all_daily` ends every live session of every service chat.
//!
//! A failure on one bus or session is logged and recorded in the report;
//! the run carries on with the rest.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::sync::Arc;

use super::{CommandError, IntervalStore, OpenSession, SessionLifecycleController, TokenReport};
use crate::domain::chat::{Bus, ChatConfig};
use crate::domain::foundation::{BookId, BusId, ChatId};
use crate::domain::notice::{Notice, NotifyTarget};
use crate::domain::schedule::{OverrideStatus, ScheduleError};
use crate::ports::{ChatDirectory, Delivery, Notifier};

/// What happened to one bus in a daily run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "decision")]
pub enum BusDecision {
    Opened { book_id: BookId },
    /// A CANCEL override suppressed the session.
    NotRunning,
    /// No override and the target date falls on a weekend.
    Weekend,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BusOutcome {
    pub chat_id: ChatId,
    pub bus_id: BusId,
    #[serde(flatten)]
    pub decision: BusDecision,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyReport {
    pub target_date: NaiveDate,
    pub buses: Vec<BusOutcome>,
    pub purged_ranges: usize,
}

impl DailyReport {
    pub fn opened(&self) -> Vec<BookId> {
        self.buses
            .iter()
            .filter_map(|b| match b.decision {
                BusDecision::Opened { book_id } => Some(book_id),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndOfDayReport {
    pub ended: Vec<BookId>,
    pub tokens: TokenReport,
    pub chats_notified: usize,
    pub failures: Vec<String>,
}

pub struct DailyOrchestrator {
    directory: Arc<dyn ChatDirectory>,
    intervals: Arc<IntervalStore>,
    lifecycle: Arc<SessionLifecycleController>,
    notifier: Arc<dyn Notifier>,
}

impl DailyOrchestrator {
    pub fn new(
        directory: Arc<dyn ChatDirectory>,
        intervals: Arc<IntervalStore>,
        lifecycle: Arc<SessionLifecycleController>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            directory,
            intervals,
            lifecycle,
            notifier,
        }
    }

    /// Opens or suppresses tomorrow's session for every bus of every
    /// service chat, then purges expired overrides.
    pub async fn run_daily(&self, today: NaiveDate) -> Result<DailyReport, CommandError> {
        let target_date = today
            .succ_opt()
            .ok_or(ScheduleError::DateOutOfRange(today))?;
        let chats = self.directory.list().await?;
        tracing::info!(today = %today, target_date = %target_date, chats = chats.len(), "Daily run started");

        let mut buses = Vec::new();
        for chat in chats.iter().filter(|c| !c.is_admin()) {
            for bus in &chat.buses {
                let decision = match self.plan_bus(chat, bus, target_date).await {
                    Ok(decision) => decision,
                    Err(e) => {
                        tracing::error!(bus_id = %bus.bus_id, "Daily run failed for bus: {}", e);
                        BusDecision::Failed {
                            reason: e.to_string(),
                        }
                    }
                };
                buses.push(BusOutcome {
                    chat_id: chat.chat_id,
                    bus_id: bus.bus_id,
                    decision,
                });
            }
        }

        let mut purged_ranges = 0;
        for bus in chats.iter().flat_map(|c| c.buses.iter()) {
            match self.intervals.purge_expired(bus.bus_id, today).await {
                Ok(removed) => purged_ranges += removed,
                Err(e) => tracing::warn!(bus_id = %bus.bus_id, "Schedule purge failed: {}", e),
            }
        }

        let report = DailyReport {
            target_date,
            buses,
            purged_ranges,
        };
        tracing::info!(
            opened = report.opened().len(),
            purged_ranges,
            "Daily run finished"
        );
        Ok(report)
    }

    /// Ends every live session of every service chat and tells each chat.
    pub async fn end_all_daily(&self, today: NaiveDate) -> Result<EndOfDayReport, CommandError> {
        let chats = self.directory.list().await?;
        tracing::info!(today = %today, "End-of-day run started");

        let mut report = EndOfDayReport {
            ended: Vec::new(),
            tokens: TokenReport::default(),
            chats_notified: 0,
            failures: Vec::new(),
        };

        for chat in chats.iter().filter(|c| !c.is_admin()) {
            let sessions = match self.lifecycle.live_sessions(chat.chat_id).await {
                Ok(sessions) => sessions,
                Err(e) => {
                    tracing::error!(chat_id = %chat.chat_id, "Failed to list sessions: {}", e);
                    report.failures.push(format!("chat {}: {}", chat.chat_id, e));
                    continue;
                }
            };

            for session in sessions {
                match self.lifecycle.end_session(chat.chat_id, session.id()).await {
                    Ok(ended) => {
                        report.ended.push(ended.session.book_id());
                        report.tokens.absorb(ended.tokens);
                    }
                    Err(e) => {
                        tracing::error!(book_id = %session.book_id(), "Failed to end session: {}", e);
                        report
                            .failures
                            .push(format!("booking {}: {}", session.book_id(), e));
                    }
                }
            }

            let delivery = self
                .notifier
                .notify(NotifyTarget::Chat(chat.chat_id), &Notice::EndedForTheDay)
                .await;
            match delivery {
                Delivery::Delivered => report.chats_notified += 1,
                Delivery::Failed(reason) => {
                    tracing::warn!(chat_id = %chat.chat_id, "Failed to deliver end-of-day notice: {}", reason)
                }
            }
        }

        tracing::info!(ended = report.ended.len(), "End-of-day run finished");
        Ok(report)
    }

    async fn plan_bus(
        &self,
        chat: &ChatConfig,
        bus: &Bus,
        target_date: NaiveDate,
    ) -> Result<BusDecision, CommandError> {
        match self.intervals.lookup_status(bus.bus_id, target_date).await? {
            Some(OverrideStatus::Cancel) => {
                let notice = Notice::NotRunning {
                    bus_id: bus.bus_id,
                    date: target_date,
                };
                if let Delivery::Failed(reason) = self
                    .notifier
                    .notify(NotifyTarget::Chat(chat.chat_id), &notice)
                    .await
                {
                    tracing::warn!(chat_id = %chat.chat_id, "Failed to deliver not-running notice: {}", reason);
                }
                Ok(BusDecision::NotRunning)
            }
            Some(OverrideStatus::Run) => self.open_for(chat, bus, target_date).await,
            None if is_weekend(target_date) => Ok(BusDecision::Weekend),
            None => self.open_for(chat, bus, target_date).await,
        }
    }

    async fn open_for(
        &self,
        chat: &ChatConfig,
        bus: &Bus,
        target_date: NaiveDate,
    ) -> Result<BusDecision, CommandError> {
        let session = self
            .lifecycle
            .open(OpenSession {
                chat_id: chat.chat_id,
                bus_id: Some(bus.bus_id),
                date: target_date,
                time_slot: bus.time.clone(),
                capacity: chat.max_riders,
            })
            .await?;
        Ok(BusDecision::Opened {
            book_id: session.book_id(),
        })
    }
}

/// Saturday and Sunday have no default service.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryChatDirectory, InMemoryRidershipLedger, InMemoryScheduleRepository,
        InMemorySessionStore,
    };
    use crate::adapters::notify::{RecordingNotifier, RecordingRenderer};
    use crate::domain::chat::ChatType;
    use crate::domain::schedule::ScheduleOverride;
    use crate::domain::session::Rider;
    use crate::domain::foundation::RiderId;
    use crate::ports::{RidershipLedger, ScheduleRepository, SessionStore};

    const SERVICE: ChatId = ChatId::new(-1);
    const ADMIN: ChatId = ChatId::new(-2);
    const BUS_A: BusId = BusId::new(1);
    const BUS_B: BusId = BusId::new(2);

    // 2025-01-13 is a Monday.
    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    struct Harness {
        orchestrator: DailyOrchestrator,
        lifecycle: Arc<SessionLifecycleController>,
        schedules: Arc<InMemoryScheduleRepository>,
        sessions: Arc<InMemorySessionStore>,
        ledger: Arc<InMemoryRidershipLedger>,
        notifier: Arc<RecordingNotifier>,
    }

    async fn harness() -> Harness {
        let directory = Arc::new(InMemoryChatDirectory::new());
        directory
            .register(ChatConfig {
                chat_id: SERVICE,
                chat_type: ChatType::Service,
                max_riders: 40,
                pickup: "Camp".to_string(),
                destination: "Station".to_string(),
                buses: vec![
                    Bus {
                        bus_id: BUS_A,
                        chat_id: SERVICE,
                        time: "0630".to_string(),
                    },
                    Bus {
                        bus_id: BUS_B,
                        chat_id: SERVICE,
                        time: "0700".to_string(),
                    },
                ],
            })
            .await;
        directory
            .register(ChatConfig {
                chat_id: ADMIN,
                chat_type: ChatType::Admin,
                max_riders: 40,
                pickup: String::new(),
                destination: String::new(),
                buses: vec![],
            })
            .await;

        let schedules = Arc::new(InMemoryScheduleRepository::new());
        let sessions = Arc::new(InMemorySessionStore::new());
        let ledger = Arc::new(InMemoryRidershipLedger::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let intervals = Arc::new(IntervalStore::new(schedules.clone(), directory.clone()));
        let lifecycle = Arc::new(SessionLifecycleController::new(
            sessions.clone(),
            ledger.clone(),
            directory.clone(),
            notifier.clone(),
            Arc::new(RecordingRenderer::new()),
        ));
        let orchestrator =
            DailyOrchestrator::new(directory, intervals, lifecycle.clone(), notifier.clone());

        Harness {
            orchestrator,
            lifecycle,
            schedules,
            sessions,
            ledger,
            notifier,
        }
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(jan(18)));
        assert!(is_weekend(jan(19)));
        assert!(!is_weekend(jan(20)));
    }

    #[tokio::test]
    async fn weekday_opens_one_session_per_bus() {
        let h = harness().await;
        let report = h.orchestrator.run_daily(jan(13)).await.unwrap();

        assert_eq!(report.target_date, jan(14));
        assert_eq!(report.opened().len(), 2);
        let sessions = h.sessions.list_by_chat(SERVICE).await.unwrap();
        assert_eq!(sessions.len(), 2);
        assert!(sessions.iter().all(|s| s.date() == jan(14) && s.capacity() == 40));
        assert!(h.sessions.list_by_chat(ADMIN).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn weekend_without_override_opens_nothing_for_any_bus() {
        let h = harness().await;
        // Friday: target is Saturday.
        let report = h.orchestrator.run_daily(jan(17)).await.unwrap();

        assert!(report.opened().is_empty());
        assert!(report
            .buses
            .iter()
            .all(|b| b.decision == BusDecision::Weekend));
    }

    #[tokio::test]
    async fn run_override_opens_on_weekend() {
        let h = harness().await;
        h.schedules
            .seed(
                BUS_B,
                vec![ScheduleOverride::single_day(BUS_B, jan(18), OverrideStatus::Run)],
            )
            .await;

        let report = h.orchestrator.run_daily(jan(17)).await.unwrap();

        assert_eq!(report.opened().len(), 1);
        let session = &h.sessions.list_by_chat(SERVICE).await.unwrap()[0];
        assert_eq!(session.bus_id(), Some(BUS_B));
        assert_eq!(session.time_slot(), "0700");
    }

    #[tokio::test]
    async fn cancel_override_sends_not_running_instead() {
        let h = harness().await;
        h.schedules
            .seed(
                BUS_A,
                vec![ScheduleOverride::new(BUS_A, jan(10), jan(15), OverrideStatus::Cancel).unwrap()],
            )
            .await;

        let report = h.orchestrator.run_daily(jan(13)).await.unwrap();

        assert_eq!(report.opened().len(), 1);
        assert!(report.buses.contains(&BusOutcome {
            chat_id: SERVICE,
            bus_id: BUS_A,
            decision: BusDecision::NotRunning,
        }));
        let notices = h.notifier.sent_to(NotifyTarget::Chat(SERVICE)).await;
        assert_eq!(
            notices,
            vec![Notice::NotRunning {
                bus_id: BUS_A,
                date: jan(14)
            }]
        );
    }

    #[tokio::test]
    async fn daily_run_purges_expired_overrides() {
        let h = harness().await;
        h.schedules
            .seed(
                BUS_A,
                vec![ScheduleOverride::new(BUS_A, jan(1), jan(5), OverrideStatus::Cancel).unwrap()],
            )
            .await;

        let report = h.orchestrator.run_daily(jan(13)).await.unwrap();

        assert_eq!(report.purged_ranges, 1);
        assert!(h.schedules.load(BUS_A).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn end_all_daily_ends_every_live_session() {
        let h = harness().await;
        h.orchestrator.run_daily(jan(13)).await.unwrap();
        let sessions = h.sessions.list_by_chat(SERVICE).await.unwrap();
        h.lifecycle
            .join(SERVICE, sessions[0].id(), Rider::new(RiderId::new(7), "gina"))
            .await
            .unwrap();
        h.lifecycle.close(sessions[1].book_id()).await.unwrap();
        h.notifier.clear().await;

        let report = h.orchestrator.end_all_daily(jan(13)).await.unwrap();

        assert_eq!(report.ended.len(), 2);
        assert_eq!(report.tokens.delivered, 1);
        assert_eq!(report.chats_notified, 1);
        assert!(h.sessions.is_empty().await);
        assert_eq!(
            h.ledger
                .daily_totals(SERVICE)
                .await
                .unwrap()
                .iter()
                .map(|d| d.riders)
                .sum::<u32>(),
            1
        );
        assert_eq!(
            h.notifier.sent_to(NotifyTarget::Chat(SERVICE)).await,
            vec![Notice::EndedForTheDay]
        );
        assert!(h.notifier.sent_to(NotifyTarget::Chat(ADMIN)).await.is_empty());
    }
}
