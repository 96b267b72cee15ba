// --- File: crates/connectify_scheduling/src/conflict.rs ---
use chrono::NaiveTime;
use connectify_common::models::{hhmm, Meeting};
use serde::{Deserialize, Serialize};

use crate::time_slot::TimeSlot;

/// A stored meeting that overlaps the candidate.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictingMeeting {
    pub id: String,
    pub title: String,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:30"))]
    pub time: NaiveTime,
    pub duration: u32,
}

impl From<&Meeting> for ConflictingMeeting {
    fn from(meeting: &Meeting) -> Self {
        Self {
            id: meeting.id.clone(),
            title: meeting.title.clone(),
            time: meeting.start_time,
            duration: meeting.duration_minutes,
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    pub has_conflicts: bool,
    pub conflicts: Vec<ConflictingMeeting>,
}

/// Every non-cancelled meeting overlapping `candidate`, skipping
/// `exclude_meeting_id` so a meeting being rescheduled does not clash with
/// itself. Input order is kept.
pub fn find_conflicts(
    meetings: &[Meeting],
    candidate: TimeSlot,
    exclude_meeting_id: Option<&str>,
) -> ConflictReport {
    let conflicts: Vec<ConflictingMeeting> = meetings
        .iter()
        .filter(|m| !m.is_cancelled())
        .filter(|m| exclude_meeting_id != Some(m.id.as_str()))
        .filter(|m| TimeSlot::of_meeting(m).overlaps(&candidate))
        .map(ConflictingMeeting::from)
        .collect();

    ConflictReport {
        has_conflicts: !conflicts.is_empty(),
        conflicts,
    }
}
