//! User-facing message text.
//!
//! The only place notices, sessions and schedules are turned into words.

use chrono::NaiveDate;

use crate::domain::chat::ChatConfig;
use crate::domain::notice::Notice;
use crate::domain::schedule::ScheduleOverride;
use crate::domain::session::RegistrationSession;

pub const MAX_RIDERS_MSG: &str = "The maximum number of riders have been registered. \
Please find alternative means of transport, or check again later.";
pub const OPEN_SPACES_MSG: &str = "New spaces have opened up for shuttle bus registration!";
pub const CLOSE_MSG: &str = "Registration has been closed by the admin.";
pub const REOPEN_MSG: &str = "Registration has been reopened by the admin.";
pub const END_MSG: &str = "Registration has ended.";
pub const END_DAILY_MSG: &str = "Registration has been ended for the day.";
pub const CANCEL_MSG: &str = "Registration has been cancelled by the admin.";

/// Display format for session dates, e.g. `14 Jan 25`.
const DISPLAY_DATE: &str = "%d %b %y";

/// Compact format used when listing a schedule, e.g. `140125`.
const SCHEDULE_DATE: &str = "%d%m%y";

pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE).to_string()
}

/// Text for a notice.
///
/// Per-booking notices are prefixed with the booking id so admins managing
/// several chats can tell them apart.
pub fn notice_text(notice: &Notice) -> String {
    match notice {
        Notice::SessionFull { .. } => MAX_RIDERS_MSG.to_string(),
        Notice::SpacesOpened { .. } => OPEN_SPACES_MSG.to_string(),
        Notice::RegistrationClosed { book_id } => format!("[{}] {}", book_id, CLOSE_MSG),
        Notice::RegistrationReopened { book_id } => format!("[{}] {}", book_id, REOPEN_MSG),
        Notice::RegistrationEnded { book_id } => format!("[{}] {}", book_id, END_MSG),
        Notice::RegistrationCancelled { book_id } => format!("[{}] {}", book_id, CANCEL_MSG),
        Notice::EndedForTheDay => END_DAILY_MSG.to_string(),
        Notice::NotRunning { bus_id, date } => format!(
            "Dear all, bus {} will not be running on {}.",
            bus_id,
            display_date(*date)
        ),
        Notice::BookingConfirmed {
            pickup,
            destination,
            date,
            time_slot,
            ..
        } => format!(
            "Your registration for the shuttle bus from {} to {} for {} at {} has been confirmed.",
            pickup,
            destination,
            display_date(*date),
            time_slot
        ),
        Notice::NextDaySkipped { date } => format!(
            "Automatic registration for {} has been cancelled.",
            display_date(*date)
        ),
        Notice::NextDayRestored { date } => format!(
            "Automatic registration for {} has been restored.",
            display_date(*date)
        ),
    }
}

/// Registration message body: header plus the roster in join order.
pub fn registration_text(session: &RegistrationSession, chat: Option<&ChatConfig>) -> String {
    let (pickup, destination) = chat
        .map(|c| (c.pickup.as_str(), c.destination.as_str()))
        .unwrap_or(("?", "?"));

    let mut text = format!(
        "Booking ID: {}\nRegistration of {} to {} Shuttle Bus slots for {} at {}.",
        session.book_id(),
        pickup,
        destination,
        display_date(session.date()),
        session.time_slot()
    );
    if !session.roster().is_empty() {
        text.push_str("\n\nPlaces Reserved:");
        for rider in session.roster() {
            text.push('\n');
            text.push_str(rider.display_name());
        }
    }
    text
}

/// One schedule line: `start[-end] RUNNING|CANCELLED`.
pub fn schedule_line(entry: &ScheduleOverride) -> String {
    let start = entry.start_date().format(SCHEDULE_DATE);
    if entry.is_single_day() {
        format!("{} {}", start, entry.status())
    } else {
        format!(
            "{}-{} {}",
            start,
            entry.end_date().format(SCHEDULE_DATE),
            entry.status()
        )
    }
}
