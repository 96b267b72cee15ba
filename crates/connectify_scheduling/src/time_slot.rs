// --- File: crates/connectify_scheduling/src/time_slot.rs ---
//! Half-open minute intervals on a single day.

use chrono::NaiveTime;
use connectify_common::models::{minutes_of_day, Meeting};
use std::fmt;

/// `[start, end)` in minutes since midnight.
///
/// `end` may pass 1440 for a meeting running past midnight; the interval is
/// still compared on the day it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TimeSlot {
    pub start: u32,
    pub end: u32,
}

impl TimeSlot {
    pub fn new(start: u32, duration_minutes: u32) -> Self {
        Self {
            start,
            end: start.saturating_add(duration_minutes),
        }
    }

    pub fn starting_at(time: NaiveTime, duration_minutes: u32) -> Self {
        Self::new(minutes_of_day(time), duration_minutes)
    }

    /// The interval a meeting occupies.
    pub fn of_meeting(meeting: &Meeting) -> Self {
        Self::new(meeting.start_minutes(), meeting.duration_minutes)
    }

    pub fn duration(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Touching intervals do not overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn start_time(&self) -> Option<NaiveTime> {
        time_of(self.start)
    }

    pub fn end_time(&self) -> Option<NaiveTime> {
        time_of(self.end)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start / 60,
            self.start % 60,
            self.end / 60,
            self.end % 60
        )
    }
}

/// `None` for minute offsets outside the day.
pub fn time_of(minutes: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0)
}
