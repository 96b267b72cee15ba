// --- File: crates/connectify_scheduling/src/availability.rs ---
use chrono::NaiveTime;
use connectify_common::models::{hhmm, minutes_of_day, Meeting};
use connectify_config::SchedulingConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::time_slot::TimeSlot;

/// Bounds of the bookable day and the grid candidates are placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingHours {
    /// Minutes since midnight.
    pub start: u32,
    /// Minutes since midnight; candidates must end at or before it.
    pub end: u32,
    pub granularity: u32,
}

impl WorkingHours {
    /// Hours are clamped to 0..=23 and the granularity to at least one minute.
    pub fn from_config(config: &SchedulingConfig) -> Self {
        let start_hour = config.work_start_hour.min(23);
        let end_hour = config.work_end_hour.clamp(start_hour, 23);
        Self {
            start: start_hour * 60,
            end: end_hour * 60,
            granularity: config.slot_granularity_minutes.max(1),
        }
    }

    pub fn end_hour(&self) -> u32 {
        self.end / 60
    }
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self::from_config(&SchedulingConfig::default())
    }
}

/// A free candidate interval. Derived on request, never stored.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "09:00"))]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:00"))]
    pub end: NaiveTime,
    pub available: bool,
}

impl AvailabilitySlot {
    pub fn slot(&self) -> TimeSlot {
        let start = minutes_of_day(self.start);
        let end = minutes_of_day(self.end);
        TimeSlot { start, end }
    }
}

/// Intervals a user is busy with: every non-cancelled meeting they are part of.
pub fn busy_slots(meetings: &[Meeting]) -> Vec<TimeSlot> {
    meetings
        .iter()
        .filter(|m| !m.is_cancelled())
        .map(TimeSlot::of_meeting)
        .collect()
}

/// Walks the working-hours grid and keeps every candidate of `duration_minutes`
/// that ends within working hours and overlaps no busy interval.
///
/// Results are chronological. A zero duration yields nothing.
pub fn calculate_available_slots(
    busy: &[TimeSlot],
    duration_minutes: u32,
    hours: WorkingHours,
) -> Vec<AvailabilitySlot> {
    if duration_minutes == 0 {
        return Vec::new();
    }

    let step = hours.granularity.max(1);
    let mut available = Vec::new();
    let mut candidate_start = hours.start;

    while candidate_start < hours.end {
        let candidate = TimeSlot::new(candidate_start, duration_minutes);
        if candidate.end > hours.end {
            // Every later start ends even later.
            break;
        }
        if !busy.iter().any(|b| b.overlaps(&candidate)) {
            if let (Some(start), Some(end)) = (candidate.start_time(), candidate.end_time()) {
                available.push(AvailabilitySlot {
                    start,
                    end,
                    available: true,
                });
            }
        }
        candidate_start += step;
    }

    debug!(
        "{} of the candidates between {} and {} are free for {} minutes",
        available.len(),
        hours.start,
        hours.end,
        duration_minutes
    );
    available
}
