//! Override status carried by a schedule range.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Forces an occurrence to run or not run, regardless of the weekday rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideStatus {
    Run,
    Cancel,
}

impl OverrideStatus {
    /// Storage code: `0` = RUN, `1` = CANCEL.
    pub fn code(&self) -> i16 {
        match self {
            OverrideStatus::Run => 0,
            OverrideStatus::Cancel => 1,
        }
    }

    /// Parses a storage code.
    pub fn from_code(code: i16) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(OverrideStatus::Run),
            1 => Ok(OverrideStatus::Cancel),
            other => Err(ValidationError::out_of_range("status", 0, 1, other.into())),
        }
    }
}

impl fmt::Display for OverrideStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OverrideStatus::Run => "RUNNING",
            OverrideStatus::Cancel => "CANCELLED",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_storage_contract() {
        assert_eq!(OverrideStatus::Run.code(), 0);
        assert_eq!(OverrideStatus::Cancel.code(), 1);
        assert_eq!(OverrideStatus::from_code(1), Ok(OverrideStatus::Cancel));
    }

    #[test]
    fn unknown_code_is_rejected() {
        assert!(OverrideStatus::from_code(2).is_err());
    }
}
