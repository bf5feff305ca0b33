//! Schedule override handlers.

mod next_day;
mod override_schedule;
mod view_schedule;

pub use next_day::{NextDayAction, NextDayCommand, NextDayHandler, NextDayResult};
pub use override_schedule::{
    DateRange, OverrideScheduleCommand, OverrideScheduleHandler, OverrideScheduleResult,
};
pub use view_schedule::{ScheduleView, ViewScheduleHandler};
