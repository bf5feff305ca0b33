//! ScheduleOverride value object.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{OverrideStatus, ScheduleError};
use crate::domain::foundation::BusId;

/// An inclusive date range forcing one bus to run or not run.
///
/// # Invariants
///
/// - `start_date <= end_date`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduleOverride {
    bus_id: BusId,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: OverrideStatus,
}

impl ScheduleOverride {
    /// Creates an override over `start_date..=end_date`.
    ///
    /// # Errors
    ///
    /// - `InvalidRange` if `start_date` is after `end_date`
    pub fn new(
        bus_id: BusId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        status: OverrideStatus,
    ) -> Result<Self, ScheduleError> {
        if start_date > end_date {
            return Err(ScheduleError::invalid_range(start_date, end_date));
        }
        Ok(Self {
            bus_id,
            start_date,
            end_date,
            status,
        })
    }

    /// Creates a one-day override.
    pub fn single_day(bus_id: BusId, date: NaiveDate, status: OverrideStatus) -> Self {
        Self {
            bus_id,
            start_date: date,
            end_date: date,
            status,
        }
    }

    pub fn bus_id(&self) -> BusId {
        self.bus_id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn status(&self) -> OverrideStatus {
        self.status
    }

    /// Returns true if `date` falls inside the range.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Returns true if the range is a single day.
    pub fn is_single_day(&self) -> bool {
        self.start_date == self.end_date
    }
}

/// Finds the override status covering `date`, if any.
///
/// Linear scan over a canonical set; canonical sets never hold two ranges
/// containing the same date.
pub fn status_on(overrides: &[ScheduleOverride], date: NaiveDate) -> Option<OverrideStatus> {
    overrides
        .iter()
        .find(|o| o.contains(date))
        .map(|o| o.status())
}
