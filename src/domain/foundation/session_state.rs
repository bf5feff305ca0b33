//! SessionState enum for the registration session lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle state of a registration session.
///
/// `Open` and `Closed` are the only live states. `Ended` and `Cancelled`
/// are terminal and the session leaves the store once it reaches either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Open,
    Closed,
    Ended,
    Cancelled,
}

impl SessionState {
    /// Returns true if riders may join or leave.
    pub fn accepts_riders(&self) -> bool {
        matches!(self, SessionState::Open)
    }
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (Open, Closed)
                | (Closed, Open)
                | (Open, Ended)
                | (Closed, Ended)
                | (Open, Cancelled)
                | (Closed, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            Open => vec![Closed, Ended, Cancelled],
            Closed => vec![Open, Ended, Cancelled],
            Ended | Cancelled => vec![],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Open => "Open",
            SessionState::Closed => "Closed",
            SessionState::Ended => "Ended",
            SessionState::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_open() {
        assert_eq!(SessionState::default(), SessionState::Open);
    }

    #[test]
    fn only_open_accepts_riders() {
        assert!(SessionState::Open.accepts_riders());
        assert!(!SessionState::Closed.accepts_riders());
        assert!(!SessionState::Ended.accepts_riders());
        assert!(!SessionState::Cancelled.accepts_riders());
    }

    #[test]
    fn open_and_closed_toggle() {
        assert!(SessionState::Open.can_transition_to(&SessionState::Closed));
        assert!(SessionState::Closed.can_transition_to(&SessionState::Open));
        assert!(!SessionState::Open.can_transition_to(&SessionState::Open));
    }

    #[test]
    fn terminal_states_have_no_exits() {
        assert!(SessionState::Ended.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(!SessionState::Ended.can_transition_to(&SessionState::Open));
        assert!(!SessionState::Cancelled.can_transition_to(&SessionState::Ended));
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for state in [
            SessionState::Open,
            SessionState::Closed,
            SessionState::Ended,
            SessionState::Cancelled,
        ] {
            for target in state.valid_transitions() {
                assert!(state.can_transition_to(&target), "{:?} -> {:?}", state, target);
            }
        }
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&SessionState::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
