//! What a successful command returns.

use serde::Serialize;

use crate::application::handlers::{
    MigrateChatResult, NextDayResult, RouteRidership, ScheduleView,
};
use crate::application::{DailyReport, EndOfDayReport, EndedSession, RosterUpdate};
use crate::domain::session::RegistrationSession;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "data")]
pub enum CommandOutcome {
    /// A session was opened, closed, reopened or cancelled.
    Session(RegistrationSession),
    Roster(RosterUpdate),
    Ended(EndedSession),
    NextDay(NextDayResult),
    Schedule(ScheduleView),
    Ridership(Vec<RouteRidership>),
    Daily(DailyReport),
    EndOfDay(EndOfDayReport),
    Migrated(MigrateChatResult),
}
