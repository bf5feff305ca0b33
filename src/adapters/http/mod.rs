//! HTTP adapter - JSON front end over the command dispatcher.
//!
//! Chat front ends post commands here; a scheduler posts the two daily
//! triggers.

mod dto;
mod handlers;
mod routes;

pub use dto::{CommandRequest, CommandResponse, ErrorResponse, ScheduleResponse, TriggerQuery};
pub use handlers::BookingApi;
pub use routes::booking_routes;
