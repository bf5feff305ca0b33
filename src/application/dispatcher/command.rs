//! Tagged command enum, decoded once at the boundary.

use serde::{Deserialize, Serialize};

use crate::application::handlers::DateRange;
use crate::application::Capability;
use crate::domain::foundation::{BookId, BusId, ChatId, SessionId};
use crate::domain::schedule::OverrideStatus;

/// Time slot used when an admin opens registration without naming one.
pub const UNSPECIFIED_TIME_SLOT: &str = "NA";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Command {
    /// Open registration for tomorrow in the caller's chat.
    OpenSession {
        #[serde(default)]
        time_slot: Option<String>,
    },
    Join {
        session_id: SessionId,
    },
    Leave {
        session_id: SessionId,
    },
    Close {
        book_id: BookId,
    },
    Reopen {
        book_id: BookId,
    },
    End {
        book_id: BookId,
    },
    Cancel {
        book_id: BookId,
    },
    SkipNextDay,
    UnskipNextDay,
    OverrideSchedule {
        bus_id: BusId,
        ranges: Vec<DateRange>,
        status: OverrideStatus,
    },
    ViewSchedule {
        bus_id: BusId,
    },
    RidershipSummary,
    DailyTrigger,
    EndOfDayTrigger,
    /// The chat platform moved a group to a new id.
    MigrateChat {
        from: ChatId,
        to: ChatId,
    },
}

impl Command {
    pub fn required_capability(&self) -> Capability {
        match self {
            Command::Join { .. } | Command::Leave { .. } => Capability::Member,
            Command::OpenSession { .. } | Command::SkipNextDay | Command::UnskipNextDay => {
                Capability::ServiceChatAdmin
            }
            Command::Close { .. }
            | Command::Reopen { .. }
            | Command::End { .. }
            | Command::Cancel { .. }
            | Command::OverrideSchedule { .. }
            | Command::ViewSchedule { .. }
            | Command::RidershipSummary => Capability::AdminChatAdmin,
            Command::DailyTrigger | Command::EndOfDayTrigger | Command::MigrateChat { .. } => {
                Capability::System
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::OpenSession { .. } => "open_session",
            Command::Join { .. } => "join",
            Command::Leave { .. } => "leave",
            Command::Close { .. } => "close",
            Command::Reopen { .. } => "reopen",
            Command::End { .. } => "end",
            Command::Cancel { .. } => "cancel",
            Command::SkipNextDay => "skip_next_day",
            Command::UnskipNextDay => "unskip_next_day",
            Command::OverrideSchedule { .. } => "override_schedule",
            Command::ViewSchedule { .. } => "view_schedule",
            Command::RidershipSummary => "ridership_summary",
            Command::DailyTrigger => "daily_trigger",
            Command::EndOfDayTrigger => "end_of_day_trigger",
            Command::MigrateChat { .. } => "migrate_chat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_tagged_json() {
        let cmd: Command = serde_json::from_str(r#"{"type":"close","book_id":12}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Close {
                book_id: BookId::new(12)
            }
        );

        let cmd: Command = serde_json::from_str(
            r#"{"type":"override_schedule","bus_id":3,"status":"cancel",
                "ranges":[{"start":"2025-01-10","end":"2025-01-12"},{"start":"2025-01-20"}]}"#,
        )
        .unwrap();
        assert!(matches!(cmd, Command::OverrideSchedule { ref ranges, .. } if ranges.len() == 2));
    }

    #[test]
    fn open_session_time_slot_is_optional() {
        let cmd: Command = serde_json::from_str(r#"{"type":"open_session"}"#).unwrap();
        assert_eq!(cmd, Command::OpenSession { time_slot: None });
    }

    #[test]
    fn triggers_require_system() {
        assert_eq!(Command::DailyTrigger.required_capability(), Capability::System);
        let migrate: Command =
            serde_json::from_str(r#"{"type":"migrate_chat","from":-100,"to":-100200}"#).unwrap();
        assert_eq!(migrate.required_capability(), Capability::System);
        assert_eq!(
            Command::RidershipSummary.required_capability(),
            Capability::AdminChatAdmin
        );
    }
}
