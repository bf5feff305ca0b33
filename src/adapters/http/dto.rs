//! Request and response shapes for the booking API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::adapters::notify::messages::schedule_line;
use crate::application::dispatcher::{Caller, Command, CommandOutcome};
use crate::application::handlers::ScheduleView;
use crate::application::CommandError;
use crate::domain::foundation::BusId;
use crate::domain::schedule::ScheduleOverride;

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/commands`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandRequest {
    pub caller: Caller,
    pub command: Command,
    /// Overrides the server's local date, mostly for replays.
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// Query string of the trigger endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerQuery {
    pub today: Option<NaiveDate>,
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

/// A bus schedule with the chat-ready line for each entry.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub bus_id: BusId,
    pub entries: Vec<ScheduleOverride>,
    pub lines: Vec<String>,
}

impl From<ScheduleView> for ScheduleResponse {
    fn from(view: ScheduleView) -> Self {
        let lines = view.entries.iter().map(schedule_line).collect();
        Self {
            bus_id: view.bus_id,
            entries: view.entries,
            lines,
        }
    }
}

/// Successful command result.
///
/// Schedule views gain formatted lines; every other outcome is passed
/// through as the dispatcher produced it.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CommandResponse {
    Schedule {
        outcome: &'static str,
        data: ScheduleResponse,
    },
    Outcome(CommandOutcome),
}

impl From<CommandOutcome> for CommandResponse {
    fn from(outcome: CommandOutcome) -> Self {
        match outcome {
            CommandOutcome::Schedule(view) => CommandResponse::Schedule {
                outcome: "schedule",
                data: view.into(),
            },
            other => CommandResponse::Outcome(other),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// A request the server could not decode.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }
}

impl From<&CommandError> for ErrorResponse {
    fn from(err: &CommandError) -> Self {
        let details = match err {
            CommandError::Forbidden { required } => {
                Some(serde_json::json!({ "required": required }))
            }
            _ => None,
        };
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            details,
        }
    }
}
