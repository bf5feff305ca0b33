//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, the lifecycle state machine, and error types
//! that form the vocabulary of the booking domain.

mod errors;
mod ids;
mod session_state;
mod state_machine;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{BookId, BusId, ChatId, RiderId, SessionId};
pub use session_state::SessionState;
pub use state_machine::StateMachine;
