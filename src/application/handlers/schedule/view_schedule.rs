//! ViewScheduleHandler - lists a bus's override set.

use serde::Serialize;
use std::sync::Arc;

use crate::application::IntervalStore;
use crate::domain::foundation::BusId;
use crate::domain::schedule::{ScheduleError, ScheduleOverride};

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub bus_id: BusId,
    pub entries: Vec<ScheduleOverride>,
}

pub struct ViewScheduleHandler {
    intervals: Arc<IntervalStore>,
}

impl ViewScheduleHandler {
    pub fn new(intervals: Arc<IntervalStore>) -> Self {
        Self { intervals }
    }

    pub async fn handle(&self, bus_id: BusId) -> Result<ScheduleView, ScheduleError> {
        let entries = self.intervals.view(bus_id).await?;
        Ok(ScheduleView { bus_id, entries })
    }
}
