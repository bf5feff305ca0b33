//! Schedule domain module.
//!
//! Per-bus override ranges that force an occurrence to run or not run,
//! and the reconciler that keeps each bus's set canonical.

mod errors;
mod override_status;
mod reconciler;
mod schedule_override;

pub use errors::ScheduleError;
pub use override_status::OverrideStatus;
pub use reconciler::{reconcile, reconcile_for_bus};
pub use schedule_override::{status_on, ScheduleOverride};
