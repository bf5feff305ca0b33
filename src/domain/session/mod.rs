//! Session domain module.
//!
//! Registration sessions: one per bus occurrence, each with a
//! capacity-bounded roster and an open/closed/ended/cancelled lifecycle.

mod aggregate;
mod errors;
mod rider;

pub use aggregate::{RegistrationSession, RosterThreshold};
pub use errors::SessionError;
pub use rider::Rider;
