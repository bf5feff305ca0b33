//! HTTP handlers for the booking API.
//!
//! Every endpoint funnels into [`CommandDispatcher::dispatch`], so
//! authorization and error semantics are identical to any other front end.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;

use crate::application::dispatcher::{Caller, Command, CommandDispatcher};
use crate::application::CommandError;
use crate::domain::foundation::ErrorCode;

use super::dto::{CommandRequest, CommandResponse, ErrorResponse, HealthResponse, TriggerQuery};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct BookingApi {
    dispatcher: Arc<CommandDispatcher>,
}

impl BookingApi {
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self { dispatcher }
    }

    async fn run(&self, caller: &Caller, command: Command, today: Option<NaiveDate>) -> Response {
        let today = today.unwrap_or_else(local_today);
        match self.dispatcher.dispatch(caller, command, today).await {
            Ok(outcome) => (StatusCode::OK, Json(CommandResponse::from(outcome))).into_response(),
            Err(e) => handle_command_error(e),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// GET /health
pub async fn health() -> Response {
    let body = HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/commands - Run one chat command
pub async fn post_command(
    State(api): State<BookingApi>,
    payload: Result<Json<CommandRequest>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(req)) => api.run(&req.caller, req.command, req.today).await,
        Err(rejection) => handle_rejection(rejection.body_text()),
    }
}

/// POST /api/triggers/daily - Open tomorrow's sessions and purge expired overrides
pub async fn daily_trigger(
    State(api): State<BookingApi>,
    query: Result<Query<TriggerQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => api.run(&Caller::System, Command::DailyTrigger, query.today).await,
        Err(rejection) => handle_rejection(rejection.body_text()),
    }
}

/// POST /api/triggers/end-of-day - End every live session in service chats
pub async fn end_of_day_trigger(
    State(api): State<BookingApi>,
    query: Result<Query<TriggerQuery>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(query)) => {
            api.run(&Caller::System, Command::EndOfDayTrigger, query.today)
                .await
        }
        Err(rejection) => handle_rejection(rejection.body_text()),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error handling
// ════════════════════════════════════════════════════════════════════════════

fn handle_command_error(error: CommandError) -> Response {
    let status = status_for(error.code());
    if status.is_server_error() {
        tracing::error!("Command failed: {}", error);
    } else {
        tracing::debug!("Command rejected: {}", error);
    }
    (status, Json(ErrorResponse::from(&error))).into_response()
}

fn handle_rejection(reason: String) -> Response {
    tracing::debug!("Request rejected: {}", reason);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::bad_request(reason))).into_response()
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::ValidationFailed | ErrorCode::InvalidRange => StatusCode::BAD_REQUEST,
        ErrorCode::SessionNotFound | ErrorCode::BusNotFound | ErrorCode::ChatNotFound => {
            StatusCode::NOT_FOUND
        }
        ErrorCode::ChatAlreadyExists
        | ErrorCode::CapacityExceeded
        | ErrorCode::AlreadyJoined
        | ErrorCode::NotJoined
        | ErrorCode::RegistrationClosed
        | ErrorCode::InvalidStateTransition => StatusCode::CONFLICT,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::DatabaseError | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_conflicts_map_to_409() {
        assert_eq!(status_for(ErrorCode::CapacityExceeded), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::AlreadyJoined), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::RegistrationClosed), StatusCode::CONFLICT);
        assert_eq!(status_for(ErrorCode::ChatAlreadyExists), StatusCode::CONFLICT);
    }

    #[test]
    fn lookups_map_to_404() {
        assert_eq!(status_for(ErrorCode::SessionNotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(ErrorCode::ChatNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn undecodable_request_is_400_bad_request() {
        let response = handle_rejection("missing field `caller`".to_string());
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn infrastructure_maps_to_500() {
        let response = handle_command_error(CommandError::Infrastructure("down".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
