//! Schedule-specific error types.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::foundation::{BusId, DomainError, ErrorCode};

/// Errors raised while validating, reconciling or storing overrides.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// A range whose start falls after its end.
    #[error("Invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Reconciliation produced two ranges sharing a date.
    #[error("Overlapping ranges after reconciliation: {first_end} overlaps {second_start}")]
    Overlap {
        first_end: NaiveDate,
        second_start: NaiveDate,
    },

    /// Overrides for more than one bus were passed to a single reconciliation.
    #[error("Overrides for bus {found} mixed into reconciliation of bus {expected}")]
    MixedBuses { expected: BusId, found: BusId },

    /// Date arithmetic ran off the calendar.
    #[error("Date out of range next to {0}")]
    DateOutOfRange(NaiveDate),

    #[error("Unknown bus: {0}")]
    UnknownBus(BusId),

    #[error("Schedule storage error: {0}")]
    Infrastructure(String),
}

impl ScheduleError {
    pub fn invalid_range(start: NaiveDate, end: NaiveDate) -> Self {
        ScheduleError::InvalidRange { start, end }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ScheduleError::InvalidRange { .. }
            | ScheduleError::Overlap { .. }
            | ScheduleError::MixedBuses { .. }
            | ScheduleError::DateOutOfRange(_) => ErrorCode::InvalidRange,
            ScheduleError::UnknownBus(_) => ErrorCode::BusNotFound,
            ScheduleError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<DomainError> for ScheduleError {
    fn from(err: DomainError) -> Self {
        ScheduleError::Infrastructure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_errors_share_the_invalid_range_code() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        assert_eq!(ScheduleError::invalid_range(d, d).code(), ErrorCode::InvalidRange);
        assert_eq!(
            ScheduleError::Overlap {
                first_end: d,
                second_start: d
            }
            .code(),
            ErrorCode::InvalidRange
        );
    }

    #[test]
    fn unknown_bus_maps_to_not_found() {
        assert_eq!(
            ScheduleError::UnknownBus(BusId::new(3)).code(),
            ErrorCode::BusNotFound
        );
    }
}
