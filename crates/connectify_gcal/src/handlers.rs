// File: crates/connectify_gcal/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use connectify_common::models::Meeting;
use connectify_common::validation::{parse_date, require_user_id};
use connectify_common::ConnectifyError;
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{
    AuthUrlResponse, CallbackQuery, CallbackResponse, DisconnectResponse, EventsQuery,
    EventsResponse, ImportRequest, ImportResponse, SyncRequest, UserQuery,
};
use crate::sync::{CalendarSynchronizer, ConnectionStatus, DeleteOutcome};

// Shared state for the calendar handlers
#[derive(Clone)]
pub struct GcalState {
    pub synchronizer: Arc<CalendarSynchronizer>,
}

/// Consent URL for connecting the user's Google Calendar.
#[axum::debug_handler]
pub async fn auth_url_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<AuthUrlResponse>, ConnectifyError> {
    let user_id = require_user_id(&query.user_id)?;
    let url = state.synchronizer.get_auth_url(user_id)?;
    Ok(Json(AuthUrlResponse { url }))
}

/// OAuth redirect target.
#[axum::debug_handler]
pub async fn callback_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<CallbackQuery>,
) -> Result<Json<CallbackResponse>, ConnectifyError> {
    if let Some(error) = query.error {
        warn!("OAuth consent failed: {}", error);
        return Err(ConnectifyError::AuthError(format!(
            "authorization was not granted: {}",
            error
        )));
    }
    let code = query
        .code
        .ok_or_else(|| ConnectifyError::ValidationError("missing code".to_string()))?;
    let oauth_state = query
        .state
        .ok_or_else(|| ConnectifyError::ValidationError("missing state".to_string()))?;

    let user_id = state
        .synchronizer
        .complete_authorization(&code, &oauth_state)
        .await?;
    info!("Calendar connected for user {}", user_id);
    Ok(Json(CallbackResponse {
        user_id,
        connected: true,
    }))
}

#[axum::debug_handler]
pub async fn status_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ConnectionStatus>, ConnectifyError> {
    let user_id = require_user_id(&query.user_id)?;
    Ok(Json(state.synchronizer.connection_status(user_id).await?))
}

#[axum::debug_handler]
pub async fn disconnect_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<UserQuery>,
) -> Result<Json<DisconnectResponse>, ConnectifyError> {
    let user_id = require_user_id(&query.user_id)?;
    let disconnected = state.synchronizer.disconnect(user_id).await?;
    Ok(Json(DisconnectResponse {
        user_id: user_id.to_string(),
        disconnected,
    }))
}

/// Provider events in a date range, for selection before import.
#[axum::debug_handler]
pub async fn list_events_handler(
    State(state): State<Arc<GcalState>>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventsResponse>, ConnectifyError> {
    let user_id = require_user_id(&query.user_id)?;
    let start = parse_date("start_date", &query.start_date)?;
    let end = parse_date("end_date", &query.end_date)?;

    let events = state
        .synchronizer
        .list_external_events(user_id, start, end)
        .await?;
    Ok(Json(EventsResponse { events }))
}

#[axum::debug_handler]
pub async fn import_events_handler(
    State(state): State<Arc<GcalState>>,
    Json(request): Json<ImportRequest>,
) -> Result<Json<ImportResponse>, ConnectifyError> {
    let user_id = require_user_id(&request.user_id)?;
    let start = parse_date("start_date", &request.start_date)?;
    let end = parse_date("end_date", &request.end_date)?;

    let meetings = state
        .synchronizer
        .import_events(user_id, start, end, &request.event_ids)
        .await?;
    Ok(Json(ImportResponse {
        imported: meetings.len(),
        meetings,
    }))
}

/// Creates or updates the provider event of a stored meeting.
#[axum::debug_handler]
pub async fn sync_meeting_handler(
    State(state): State<Arc<GcalState>>,
    Path(meeting_id): Path<String>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<Meeting>, ConnectifyError> {
    let user_id = require_user_id(&request.user_id)?;
    let meeting = state.synchronizer.sync_meeting(user_id, &meeting_id).await?;
    Ok(Json(meeting))
}

#[axum::debug_handler]
pub async fn delete_meeting_handler(
    State(state): State<Arc<GcalState>>,
    Path(meeting_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<DeleteOutcome>, ConnectifyError> {
    let user_id = require_user_id(&query.user_id)?;
    let outcome = state
        .synchronizer
        .delete_meeting(user_id, &meeting_id)
        .await?;
    Ok(Json(outcome))
}
