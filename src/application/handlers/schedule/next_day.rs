//! NextDayHandler - the skip/unskip shortcut for tomorrow.
//!
//! Both directions write a single-day override for every bus of the chat,
//! all or none.
//! Unskipping sets RUN for the date; it never reads and toggles what was
//! there before.

use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

use crate::application::{CommandError, IntervalStore};
use crate::domain::foundation::{BusId, ChatId};
use crate::domain::notice::{Notice, NotifyTarget};
use crate::domain::schedule::{OverrideStatus, ScheduleError, ScheduleOverride};
use crate::ports::{ChatDirectory, Delivery, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextDayAction {
    Skip,
    Unskip,
}

impl NextDayAction {
    fn status(self) -> OverrideStatus {
        match self {
            NextDayAction::Skip => OverrideStatus::Cancel,
            NextDayAction::Unskip => OverrideStatus::Run,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NextDayCommand {
    pub chat_id: ChatId,
    pub action: NextDayAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextDayResult {
    pub date: NaiveDate,
    pub status: OverrideStatus,
    pub buses: Vec<BusId>,
}

pub struct NextDayHandler {
    directory: Arc<dyn ChatDirectory>,
    intervals: Arc<IntervalStore>,
    notifier: Arc<dyn Notifier>,
}

impl NextDayHandler {
    pub fn new(
        directory: Arc<dyn ChatDirectory>,
        intervals: Arc<IntervalStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            directory,
            intervals,
            notifier,
        }
    }

    pub async fn handle(
        &self,
        cmd: NextDayCommand,
        today: NaiveDate,
    ) -> Result<NextDayResult, CommandError> {
        let chat = self
            .directory
            .get(cmd.chat_id)
            .await?
            .ok_or(CommandError::UnknownChat(cmd.chat_id))?;
        let date = today
            .succ_opt()
            .ok_or(ScheduleError::DateOutOfRange(today))?;
        let status = cmd.action.status();

        let days: Vec<ScheduleOverride> = chat
            .buses
            .iter()
            .map(|bus| ScheduleOverride::single_day(bus.bus_id, date, status))
            .collect();
        let buses = self.intervals.apply_all(&days, today).await?;

        let notice = match cmd.action {
            NextDayAction::Skip => Notice::NextDaySkipped { date },
            NextDayAction::Unskip => Notice::NextDayRestored { date },
        };
        if let Delivery::Failed(reason) = self
            .notifier
            .notify(NotifyTarget::Chat(cmd.chat_id), &notice)
            .await
        {
            tracing::warn!(chat_id = %cmd.chat_id, "Failed to deliver next-day notice: {}", reason);
        }

        Ok(NextDayResult {
            date,
            status,
            buses,
        })
    }
}
