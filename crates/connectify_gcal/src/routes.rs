// --- File: crates/connectify_gcal/src/routes.rs ---
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    auth_url_handler, callback_handler, delete_meeting_handler, disconnect_handler,
    import_events_handler, list_events_handler, status_handler, sync_meeting_handler, GcalState,
};

/// Creates a router containing all routes for the Google Calendar feature.
pub fn routes(state: Arc<GcalState>) -> Router {
    Router::new()
        .route("/gcal/auth-url", get(auth_url_handler))
        .route("/gcal/callback", get(callback_handler))
        .route("/gcal/status", get(status_handler))
        .route("/gcal/connection", delete(disconnect_handler))
        .route("/gcal/events", get(list_events_handler))
        .route("/gcal/import", post(import_events_handler))
        .route("/gcal/meetings/{id}/sync", post(sync_meeting_handler))
        .route("/gcal/meetings/{id}", delete(delete_meeting_handler))
        .with_state(state)
}
