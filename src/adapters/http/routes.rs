//! HTTP routes for the booking API.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use super::handlers::{daily_trigger, end_of_day_trigger, health, post_command, BookingApi};

/// Creates the application router with tracing and a request timeout.
pub fn booking_routes(api: BookingApi, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/commands", post(post_command))
        .route("/api/triggers/daily", post(daily_trigger))
        .route("/api/triggers/end-of-day", post(end_of_day_trigger))
        .with_state(api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
}
