// --- File: crates/connectify_scheduling/src/slot_finder.rs ---
use chrono::{NaiveTime, Timelike};
use connectify_common::models::hhmm;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::availability::AvailabilitySlot;

/// A start time free for every participant, ranked by `score`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredSlot {
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "09:00"))]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:00"))]
    pub end: NaiveTime,
    /// Whole hours left in the working day at `start`; earlier is better.
    pub score: u32,
    pub participant_count: usize,
}

/// Deduplicates participants, keeping first-seen order, and puts the caller
/// first when not already listed.
pub fn participants_with_caller(caller: &str, participant_ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(caller)
        .chain(participant_ids.iter().map(String::as_str))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

/// Intersects per-participant availability on exact start times and ranks
/// the common slots.
///
/// `per_participant[0]` drives the order of candidates. Any participant with
/// no availability empties the result.
pub fn rank_common_slots(
    per_participant: &[Vec<AvailabilitySlot>],
    work_end_hour: u32,
    slot_count: usize,
) -> Vec<ScoredSlot> {
    let Some((first, rest)) = per_participant.split_first() else {
        return Vec::new();
    };
    let others: Vec<HashSet<NaiveTime>> = rest
        .iter()
        .map(|slots| slots.iter().map(|s| s.start).collect())
        .collect();

    let mut common: Vec<ScoredSlot> = first
        .iter()
        .filter(|slot| others.iter().all(|starts| starts.contains(&slot.start)))
        .map(|slot| ScoredSlot {
            start: slot.start,
            end: slot.end,
            score: work_end_hour.saturating_sub(slot.start.hour()),
            participant_count: per_participant.len(),
        })
        .collect();

    // Stable: equal scores keep chronological order.
    common.sort_by(|a, b| b.score.cmp(&a.score));
    common.truncate(slot_count);
    common
}
