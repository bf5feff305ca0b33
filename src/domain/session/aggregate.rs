//! Registration session aggregate.
//!
//! One session is the registration window for one bus occurrence in one
//! chat. It owns an ordered, duplicate-free roster bounded by a capacity
//! fixed when the session opens.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Rider, SessionError};
use crate::domain::foundation::{
    BookId, BusId, ChatId, RiderId, SessionId, SessionState, StateMachine,
};

/// Threshold crossed by a successful join or leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterThreshold {
    /// The roster just reached capacity.
    Full,
    /// The roster just dropped from full to one free place.
    SpacesOpened,
}

/// Registration session aggregate.
///
/// # Invariants
///
/// - `roster.len() <= capacity`
/// - no rider id appears twice in `roster`
/// - the roster only changes while `state` is `Open`
/// - `Ended` and `Cancelled` are final
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationSession {
    id: SessionId,
    book_id: BookId,
    chat_id: ChatId,
    bus_id: Option<BusId>,
    date: NaiveDate,
    time_slot: String,
    state: SessionState,
    roster: Vec<Rider>,
    capacity: u32,
}

impl RegistrationSession {
    /// Opens a new session with an empty roster.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if capacity is zero or the time slot is blank
    pub fn open(
        book_id: BookId,
        chat_id: ChatId,
        bus_id: Option<BusId>,
        date: NaiveDate,
        time_slot: impl Into<String>,
        capacity: u32,
    ) -> Result<Self, SessionError> {
        let time_slot = time_slot.into();
        if capacity == 0 {
            return Err(SessionError::validation("capacity", "Capacity must be positive"));
        }
        if time_slot.trim().is_empty() {
            return Err(SessionError::validation("time_slot", "Time slot cannot be empty"));
        }

        Ok(Self {
            id: SessionId::new(),
            book_id,
            chat_id,
            bus_id,
            date,
            time_slot,
            state: SessionState::Open,
            roster: Vec::new(),
            capacity,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn book_id(&self) -> BookId {
        self.book_id
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn bus_id(&self) -> Option<BusId> {
        self.bus_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time_slot(&self) -> &str {
        &self.time_slot
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn roster(&self) -> &[Rider] {
        &self.roster
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn rider_count(&self) -> u32 {
        self.roster.len() as u32
    }

    pub fn has_rider(&self, rider_id: RiderId) -> bool {
        self.roster.iter().any(|r| r.id() == rider_id)
    }

    pub fn is_full(&self) -> bool {
        self.rider_count() >= self.capacity
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Roster mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds a rider to the end of the roster.
    ///
    /// Returns `Some(Full)` when this join filled the last place.
    ///
    /// # Errors
    ///
    /// - `NotOpen` unless the session is open
    /// - `CapacityExceeded` if the roster is already full
    /// - `AlreadyJoined` if the rider is already on the roster
    pub fn join(&mut self, rider: Rider) -> Result<Option<RosterThreshold>, SessionError> {
        self.ensure_accepting()?;
        if self.is_full() {
            return Err(SessionError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if self.has_rider(rider.id()) {
            return Err(SessionError::AlreadyJoined(rider.id()));
        }

        self.roster.push(rider);
        Ok(self.is_full().then_some(RosterThreshold::Full))
    }

    /// Removes a rider, keeping the order of everyone else.
    ///
    /// Returns `Some(SpacesOpened)` when this leave freed the only place.
    ///
    /// # Errors
    ///
    /// - `NotOpen` unless the session is open
    /// - `NotJoined` if the rider is not on the roster
    pub fn leave(&mut self, rider_id: RiderId) -> Result<Option<RosterThreshold>, SessionError> {
        self.ensure_accepting()?;
        let position = self
            .roster
            .iter()
            .position(|r| r.id() == rider_id)
            .ok_or(SessionError::NotJoined(rider_id))?;

        self.roster.remove(position);
        let spaces_opened = self.rider_count() + 1 == self.capacity;
        Ok(spaces_opened.then_some(RosterThreshold::SpacesOpened))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Freezes the roster; joins and leaves are rejected until reopened.
    pub fn close(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Closed)
    }

    /// Re-enables joins and leaves on a closed session.
    pub fn reopen(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Open)
    }

    /// Finalizes the session and returns the riders owed a confirmation.
    pub fn end(&mut self) -> Result<Vec<Rider>, SessionError> {
        self.transition(SessionState::Ended)?;
        Ok(self.roster.clone())
    }

    /// Cancels the session; nobody receives a confirmation.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::Cancelled)
    }

    /// Rehomes the session after its chat was given a new id. State and
    /// roster are untouched.
    pub fn move_to_chat(&mut self, chat_id: ChatId) {
        self.chat_id = chat_id;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_accepting(&self) -> Result<(), SessionError> {
        if self.state.accepts_riders() {
            Ok(())
        } else {
            Err(SessionError::NotOpen { state: self.state })
        }
    }

    fn transition(&mut self, target: SessionState) -> Result<(), SessionError> {
        let from = self.state;
        self.state = from
            .transition_to(target)
            .map_err(|_| SessionError::InvalidTransition { from, to: target })?;
        Ok(())
    }
}
