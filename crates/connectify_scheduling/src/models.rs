// --- File: crates/connectify_scheduling/src/models.rs ---
//! Request and response bodies of the scheduling endpoints.

use connectify_common::models::Meeting;
use serde::{Deserialize, Serialize};

use crate::availability::AvailabilitySlot;
use crate::slot_finder::ScoredSlot;

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    pub user_id: String,
    /// Date in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-05"))]
    pub date: String,
    /// Duration in minutes (15-480), defaults to 60
    #[cfg_attr(feature = "openapi", schema(example = 60))]
    pub duration: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailabilityResponse {
    pub user_id: String,
    pub date: String,
    pub duration: u32,
    pub slots: Vec<AvailabilitySlot>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OptimalTimesRequest {
    /// The requesting user; always part of the search.
    pub user_id: String,
    #[serde(default)]
    pub participant_ids: Vec<String>,
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-05"))]
    pub date: String,
    pub duration: Option<u32>,
    /// Number of suggestions (1-10), defaults to 5
    pub slot_count: Option<usize>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OptimalTimesResponse {
    pub date: String,
    pub duration: u32,
    pub slots: Vec<ScoredSlot>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ConflictCheckRequest {
    pub user_id: String,
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-05"))]
    pub date: String,
    #[cfg_attr(feature = "openapi", schema(example = "10:30"))]
    pub time: String,
    pub duration: u32,
    /// Meeting being rescheduled, ignored during the check
    pub exclude_meeting_id: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecurrenceRequest {
    /// one-time, daily, weekly, bi-weekly or monthly; defaults to the meeting's rule
    pub rule: Option<String>,
    /// Last date (inclusive) in YYYY-MM-DD; defaults to the meeting's end date
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-12-31"))]
    pub until: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RecurrenceResponse {
    pub parent_meeting_id: String,
    pub created: usize,
    pub occurrences: Vec<Meeting>,
}
