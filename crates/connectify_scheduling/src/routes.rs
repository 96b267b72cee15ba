// --- File: crates/connectify_scheduling/src/routes.rs ---
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    check_conflicts_handler, expand_recurrence_handler, find_optimal_times_handler,
    get_availability_handler, SchedulingState,
};

/// Creates a router containing all scheduling routes.
pub fn routes(state: Arc<SchedulingState>) -> Router {
    Router::new()
        .route("/scheduling/availability", get(get_availability_handler))
        .route("/scheduling/optimal-times", post(find_optimal_times_handler))
        .route("/scheduling/conflicts", post(check_conflicts_handler))
        .route(
            "/scheduling/meetings/{id}/recurrence",
            post(expand_recurrence_handler),
        )
        .with_state(state)
}
