//! Ridership queries.

mod ridership_summary;

pub use ridership_summary::{RidershipSummaryHandler, RouteRidership};
