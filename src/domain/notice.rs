//! Notices the core hands to the notification collaborator.
//!
//! The core never formats message text; adapters turn these into words.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BookId, BusId, ChatId, RiderId};

/// Where a notice goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum NotifyTarget {
    Chat(ChatId),
    Rider(RiderId),
}

/// Something worth telling a chat or a rider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Notice {
    /// The roster just reached capacity.
    SessionFull { book_id: BookId },
    /// A place opened up on a previously full roster.
    SpacesOpened { book_id: BookId },
    RegistrationClosed { book_id: BookId },
    RegistrationReopened { book_id: BookId },
    RegistrationEnded { book_id: BookId },
    RegistrationCancelled { book_id: BookId },
    /// The end-of-day run finalized every live session of the chat.
    EndedForTheDay,
    /// A CANCEL override suppressed tomorrow's session for this bus.
    NotRunning { bus_id: BusId, date: NaiveDate },
    /// Confirmation token sent privately to each rider of an ended session.
    BookingConfirmed {
        book_id: BookId,
        pickup: String,
        destination: String,
        date: NaiveDate,
        time_slot: String,
    },
    /// The next-day shortcut changed tomorrow's overrides.
    NextDaySkipped { date: NaiveDate },
    NextDayRestored { date: NaiveDate },
}
