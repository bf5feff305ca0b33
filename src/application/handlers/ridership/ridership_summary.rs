//! RidershipSummaryHandler - average daily riders per service route.
//!
//! One-shot read over the ledger: for every service chat, the riders of
//! each date are summed across bookings and the per-date sums averaged.

use serde::Serialize;
use std::sync::Arc;

use crate::domain::foundation::{ChatId, DomainError};
use crate::ports::{ChatDirectory, RidershipLedger};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRidership {
    pub chat_id: ChatId,
    pub pickup: String,
    pub destination: String,
    pub days: usize,
    pub average_daily_riders: f64,
}

pub struct RidershipSummaryHandler {
    directory: Arc<dyn ChatDirectory>,
    ledger: Arc<dyn RidershipLedger>,
}

impl RidershipSummaryHandler {
    pub fn new(directory: Arc<dyn ChatDirectory>, ledger: Arc<dyn RidershipLedger>) -> Self {
        Self { directory, ledger }
    }

    pub async fn handle(&self) -> Result<Vec<RouteRidership>, DomainError> {
        let mut summary = Vec::new();
        for chat in self.directory.list().await? {
            if chat.is_admin() {
                continue;
            }
            let totals = self.ledger.daily_totals(chat.chat_id).await?;
            let days = totals.len();
            let riders: u64 = totals.iter().map(|t| u64::from(t.riders)).sum();
            let average_daily_riders = if days == 0 {
                0.0
            } else {
                riders as f64 / days as f64
            };
            summary.push(RouteRidership {
                chat_id: chat.chat_id,
                pickup: chat.pickup,
                destination: chat.destination,
                days,
                average_daily_riders,
            });
        }
        Ok(summary)
    }
}
