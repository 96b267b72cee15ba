// File: crates/connectify_scheduling/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::availability::AvailabilitySlot;
use crate::conflict::{ConflictReport, ConflictingMeeting};
use crate::models::{
    AvailabilityQuery, AvailabilityResponse, ConflictCheckRequest, OptimalTimesRequest,
    OptimalTimesResponse, RecurrenceRequest, RecurrenceResponse,
};
use crate::slot_finder::ScoredSlot;

#[utoipa::path(
    get,
    path = "/scheduling/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Free slots within working hours", body = AvailabilityResponse),
        (status = 400, description = "Invalid date, duration or user id")
    ),
    tag = "Scheduling"
)]
fn doc_get_availability_handler() {}

#[utoipa::path(
    post,
    path = "/scheduling/optimal-times",
    request_body(content = OptimalTimesRequest, example = json!({
        "user_id": "alice",
        "participant_ids": ["bob", "carol"],
        "date": "2025-05-05",
        "duration": 60,
        "slot_count": 3
    })),
    responses(
        (status = 200, description = "Common slots, best first", body = OptimalTimesResponse,
         example = json!({
             "date": "2025-05-05",
             "duration": 60,
             "slots": [
                 {"start": "09:00", "end": "10:00", "score": 9, "participant_count": 3}
             ]
         })
        ),
        (status = 400, description = "Invalid request")
    ),
    tag = "Scheduling"
)]
fn doc_find_optimal_times_handler() {}

#[utoipa::path(
    post,
    path = "/scheduling/conflicts",
    request_body(content = ConflictCheckRequest, example = json!({
        "user_id": "alice",
        "date": "2025-05-05",
        "time": "10:30",
        "duration": 30
    })),
    responses(
        (status = 200, description = "Overlapping meetings", body = ConflictReport),
        (status = 400, description = "Invalid request")
    ),
    tag = "Scheduling"
)]
fn doc_check_conflicts_handler() {}

#[utoipa::path(
    post,
    path = "/scheduling/meetings/{id}/recurrence",
    params(
        ("id" = String, Path, description = "Id of the recurring meeting")
    ),
    request_body(content = RecurrenceRequest, example = json!({
        "rule": "weekly",
        "until": "2025-06-30"
    })),
    responses(
        (status = 200, description = "Generated occurrences", body = RecurrenceResponse),
        (status = 400, description = "Invalid end date or meeting is itself an occurrence"),
        (status = 404, description = "Meeting not found")
    ),
    tag = "Scheduling"
)]
fn doc_expand_recurrence_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_get_availability_handler,
        doc_find_optimal_times_handler,
        doc_check_conflicts_handler,
        doc_expand_recurrence_handler
    ),
    components(
        schemas(
            AvailabilityQuery,
            AvailabilityResponse,
            AvailabilitySlot,
            OptimalTimesRequest,
            OptimalTimesResponse,
            ScoredSlot,
            ConflictCheckRequest,
            ConflictReport,
            ConflictingMeeting,
            RecurrenceRequest,
            RecurrenceResponse
        )
    ),
    tags(
        (name = "Scheduling", description = "Availability, conflicts and recurring meetings")
    ),
    servers(
        (url = "/api", description = "Scheduling API server")
    )
)]
pub struct SchedulingApiDoc;
