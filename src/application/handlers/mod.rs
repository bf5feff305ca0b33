//! Application handlers.
//!
//! Command and query handlers that sit beside the lifecycle controller and
//! the daily orchestrator.

pub mod chat;
pub mod ridership;
pub mod schedule;

pub use chat::{MigrateChatCommand, MigrateChatHandler, MigrateChatResult};
pub use ridership::{RidershipSummaryHandler, RouteRidership};
pub use schedule::{
    DateRange, NextDayAction, NextDayCommand, NextDayHandler, NextDayResult,
    OverrideScheduleCommand, OverrideScheduleHandler, OverrideScheduleResult, ScheduleView,
    ViewScheduleHandler,
};
