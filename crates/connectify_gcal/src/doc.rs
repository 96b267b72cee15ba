// File: crates/connectify_gcal/src/doc.rs

#![allow(dead_code)]
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use connectify_common::models::{ExternalLink, Meeting, Participant};
use connectify_common::services::{ExternalAttendee, ExternalEvent};

use crate::models::{
    AuthUrlResponse, CallbackQuery, CallbackResponse, DisconnectResponse, EventsQuery,
    EventsResponse, ImportRequest, ImportResponse, SyncRequest, UserQuery,
};
use crate::sync::{ConnectionStatus, DeleteOutcome};

#[utoipa::path(
    get,
    path = "/gcal/auth-url",
    params(UserQuery),
    responses(
        (status = 200, description = "Google consent URL", body = AuthUrlResponse),
        (status = 400, description = "Missing user id")
    ),
    tag = "GCal"
)]
fn doc_auth_url_handler() {}

#[utoipa::path(
    get,
    path = "/gcal/callback",
    params(CallbackQuery),
    responses(
        (status = 200, description = "Calendar connected", body = CallbackResponse,
         example = json!({"user_id": "alice", "connected": true})
        ),
        (status = 400, description = "Missing code, or invalid or expired state"),
        (status = 401, description = "Consent declined or code rejected")
    ),
    tag = "GCal"
)]
fn doc_callback_handler() {}

#[utoipa::path(
    get,
    path = "/gcal/status",
    params(UserQuery),
    responses(
        (status = 200, description = "Connection status", body = ConnectionStatus)
    ),
    tag = "GCal"
)]
fn doc_status_handler() {}

#[utoipa::path(
    delete,
    path = "/gcal/connection",
    params(UserQuery),
    responses(
        (status = 200, description = "Calendar credentials removed", body = DisconnectResponse)
    ),
    tag = "GCal"
)]
fn doc_disconnect_handler() {}

#[utoipa::path(
    get,
    path = "/gcal/events",
    params(EventsQuery),
    responses(
        (status = 200, description = "Provider events in the range", body = EventsResponse),
        (status = 400, description = "Invalid dates"),
        (status = 401, description = "Calendar not connected or reconnect required"),
        (status = 502, description = "Provider error"),
        (status = 504, description = "Provider timed out")
    ),
    tag = "GCal"
)]
fn doc_list_events_handler() {}

#[utoipa::path(
    post,
    path = "/gcal/import",
    request_body(content = ImportRequest, example = json!({
        "user_id": "alice",
        "start_date": "2025-05-05",
        "end_date": "2025-05-09",
        "event_ids": ["abc123xyz456"]
    })),
    responses(
        (status = 200, description = "Meetings created from provider events", body = ImportResponse),
        (status = 400, description = "No events selected or invalid dates"),
        (status = 401, description = "Calendar not connected or reconnect required")
    ),
    tag = "GCal"
)]
fn doc_import_events_handler() {}

#[utoipa::path(
    post,
    path = "/gcal/meetings/{id}/sync",
    params(("id" = String, Path, description = "Meeting id")),
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Meeting with its provider linkage", body = Meeting),
        (status = 401, description = "Calendar not connected or reconnect required"),
        (status = 404, description = "Meeting not found")
    ),
    tag = "GCal"
)]
fn doc_sync_meeting_handler() {}

#[utoipa::path(
    delete,
    path = "/gcal/meetings/{id}",
    params(("id" = String, Path, description = "Meeting id"), UserQuery),
    responses(
        (status = 200, description = "Meeting deleted; provider delete is best effort", body = DeleteOutcome),
        (status = 404, description = "Meeting not found")
    ),
    tag = "GCal"
)]
fn doc_delete_meeting_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_auth_url_handler,
        doc_callback_handler,
        doc_status_handler,
        doc_disconnect_handler,
        doc_list_events_handler,
        doc_import_events_handler,
        doc_sync_meeting_handler,
        doc_delete_meeting_handler
    ),
    components(
        schemas(
            AuthUrlResponse,
            CallbackResponse,
            ConnectionStatus,
            DisconnectResponse,
            EventsResponse,
            ExternalEvent,
            ExternalAttendee,
            ImportRequest,
            ImportResponse,
            SyncRequest,
            DeleteOutcome,
            Meeting,
            Participant,
            ExternalLink
        )
    ),
    tags(
        (name = "GCal", description = "Google Calendar connection and sync")
    ),
    servers(
        (url = "/api", description = "Calendar API server")
    )
)]
pub struct GcalApiDoc;
