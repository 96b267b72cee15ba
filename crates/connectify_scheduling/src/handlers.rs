// File: crates/connectify_scheduling/src/handlers.rs
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use connectify_common::models::RecurrenceRule;
use connectify_common::validation::{
    check_duration, check_slot_count, parse_date, parse_time, require_user_id,
};
use connectify_common::ConnectifyError;
use std::sync::Arc;
use tracing::info;

use crate::conflict::ConflictReport;
use crate::models::{
    AvailabilityQuery, AvailabilityResponse, ConflictCheckRequest, OptimalTimesRequest,
    OptimalTimesResponse, RecurrenceRequest, RecurrenceResponse,
};
use crate::service::SchedulingService;

// Shared state for the scheduling handlers
#[derive(Clone)]
pub struct SchedulingState {
    pub service: SchedulingService,
}

/// Free slots of one user on one day.
#[axum::debug_handler]
pub async fn get_availability_handler(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, ConnectifyError> {
    let user_id = require_user_id(&query.user_id)?;
    let date = parse_date("date", &query.date)?;
    let duration = check_duration(
        query
            .duration
            .unwrap_or(state.service.config().default_duration_minutes),
    )?;

    let slots = state
        .service
        .get_availability(user_id, date, Some(duration))
        .await?;

    Ok(Json(AvailabilityResponse {
        user_id: user_id.to_string(),
        date: date.to_string(),
        duration,
        slots,
    }))
}

/// Ranked start times free for the caller and every listed participant.
#[axum::debug_handler]
pub async fn find_optimal_times_handler(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<OptimalTimesRequest>,
) -> Result<Json<OptimalTimesResponse>, ConnectifyError> {
    let caller = require_user_id(&request.user_id)?;
    let date = parse_date("date", &request.date)?;
    let config = state.service.config();
    let duration = check_duration(request.duration.unwrap_or(config.default_duration_minutes))?;
    let slot_count = check_slot_count(request.slot_count.unwrap_or(config.default_slot_count))?;

    let slots = state
        .service
        .find_optimal_times(
            caller,
            &request.participant_ids,
            date,
            Some(duration),
            Some(slot_count),
        )
        .await?;

    Ok(Json(OptimalTimesResponse {
        date: date.to_string(),
        duration,
        slots,
    }))
}

/// Meetings overlapping a proposed time.
#[axum::debug_handler]
pub async fn check_conflicts_handler(
    State(state): State<Arc<SchedulingState>>,
    Json(request): Json<ConflictCheckRequest>,
) -> Result<Json<ConflictReport>, ConnectifyError> {
    let user_id = require_user_id(&request.user_id)?;
    let date = parse_date("date", &request.date)?;
    let time = parse_time("time", &request.time)?;
    let duration = check_duration(request.duration)?;

    let report = state
        .service
        .check_conflicts(
            user_id,
            date,
            time,
            duration,
            request.exclude_meeting_id.as_deref(),
        )
        .await?;
    Ok(Json(report))
}

/// Expands a stored recurring meeting and saves its occurrences.
#[axum::debug_handler]
pub async fn expand_recurrence_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(meeting_id): Path<String>,
    Json(request): Json<RecurrenceRequest>,
) -> Result<Json<RecurrenceResponse>, ConnectifyError> {
    let rule = request.rule.as_deref().map(RecurrenceRule::parse_lenient);
    let until = request
        .until
        .as_deref()
        .map(|raw| parse_date("until", raw))
        .transpose()?;

    let occurrences = state
        .service
        .expand_and_persist(&meeting_id, rule, until)
        .await?;
    info!(
        "Created {} occurrences for meeting {}",
        occurrences.len(),
        meeting_id
    );

    Ok(Json(RecurrenceResponse {
        parent_meeting_id: meeting_id,
        created: occurrences.len(),
        occurrences,
    }))
}
