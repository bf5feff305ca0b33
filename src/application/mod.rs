//! Application layer - Services, Commands, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//!
//! - `IntervalStore` - read/reconcile/write of per-bus overrides
//! - `SessionLifecycleController` - registration sessions and rosters
//! - `DailyOrchestrator` - the timer-driven daily and end-of-day runs
//! - `handlers` - schedule and ridership command/query handlers
//! - `dispatcher` - capability check and command table

mod daily_orchestrator;
pub mod dispatcher;
mod error;
pub mod handlers;
mod interval_store;
mod keyed_lock;
mod session_lifecycle;

pub use daily_orchestrator::{
    is_weekend, BusDecision, BusOutcome, DailyOrchestrator, DailyReport, EndOfDayReport,
};
pub use dispatcher::{AppPorts, Caller, Command, CommandDispatcher, CommandOutcome};
pub use error::{Capability, CommandError};
pub use interval_store::IntervalStore;
pub use keyed_lock::KeyedLocks;
pub use session_lifecycle::{
    BookingPolicy, ChatRekey, EndedSession, OpenSession, RosterUpdate, SessionLifecycleController,
    TokenReport,
};
