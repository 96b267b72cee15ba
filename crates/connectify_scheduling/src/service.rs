// --- File: crates/connectify_scheduling/src/service.rs ---
//! Request-scoped scheduling operations over a [`MeetingStore`].

use chrono::{NaiveDate, NaiveTime};
use connectify_common::models::{Meeting, RecurrenceRule};
use connectify_common::services::MeetingStore;
use connectify_config::SchedulingConfig;
use futures::future::try_join_all;
use std::sync::Arc;
use tracing::{debug, info};

use crate::availability::{busy_slots, calculate_available_slots, AvailabilitySlot, WorkingHours};
use crate::conflict::{find_conflicts, ConflictReport};
use crate::error::SchedulingError;
use crate::recurrence::expand_recurrence;
use crate::slot_finder::{participants_with_caller, rank_common_slots, ScoredSlot};
use crate::time_slot::TimeSlot;

/// Scheduling engine. Holds no per-request state; every call reads the store.
#[derive(Clone)]
pub struct SchedulingService {
    store: Arc<dyn MeetingStore>,
    config: SchedulingConfig,
}

impl SchedulingService {
    pub fn new(store: Arc<dyn MeetingStore>, config: SchedulingConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn MeetingStore> {
        &self.store
    }

    pub fn working_hours(&self) -> WorkingHours {
        WorkingHours::from_config(&self.config)
    }

    /// Free slots of `duration` (default from configuration) for the user on
    /// `date`, in chronological order.
    pub async fn get_availability(
        &self,
        user_id: &str,
        date: NaiveDate,
        duration_minutes: Option<u32>,
    ) -> Result<Vec<AvailabilitySlot>, SchedulingError> {
        let duration = duration_minutes.unwrap_or(self.config.default_duration_minutes);
        let meetings = self.store.meetings_for_user_on(user_id, date).await?;
        debug!(
            "Computing availability for {} on {} from {} meetings",
            user_id,
            date,
            meetings.len()
        );
        Ok(calculate_available_slots(
            &busy_slots(&meetings),
            duration,
            self.working_hours(),
        ))
    }

    /// Meetings of the user on `date` that overlap the candidate interval.
    pub async fn check_conflicts(
        &self,
        user_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: u32,
        exclude_meeting_id: Option<&str>,
    ) -> Result<ConflictReport, SchedulingError> {
        let meetings = self.store.meetings_for_user_on(user_id, date).await?;
        let report = find_conflicts(
            &meetings,
            TimeSlot::starting_at(time, duration_minutes),
            exclude_meeting_id,
        );
        debug!(
            "Conflict check for {} on {} at {}: {} conflicts",
            user_id,
            date,
            time,
            report.conflicts.len()
        );
        Ok(report)
    }

    /// Best common start times for the caller and `participant_ids`.
    ///
    /// Availability is fetched for all participants concurrently.
    pub async fn find_optimal_times(
        &self,
        caller_id: &str,
        participant_ids: &[String],
        date: NaiveDate,
        duration_minutes: Option<u32>,
        slot_count: Option<usize>,
    ) -> Result<Vec<ScoredSlot>, SchedulingError> {
        let participants = participants_with_caller(caller_id, participant_ids);
        let slot_count = slot_count.unwrap_or(self.config.default_slot_count);

        let per_participant = try_join_all(
            participants
                .iter()
                .map(|id| self.get_availability(id, date, duration_minutes)),
        )
        .await?;

        let ranked = rank_common_slots(
            &per_participant,
            self.working_hours().end_hour(),
            slot_count,
        );
        debug!(
            "{} common slots for {} participants on {}",
            ranked.len(),
            participants.len(),
            date
        );
        Ok(ranked)
    }

    /// Pure expansion; see [`expand_recurrence`].
    pub fn expand_recurrence(
        &self,
        base: &Meeting,
        rule: RecurrenceRule,
        until: Option<NaiveDate>,
    ) -> Vec<Meeting> {
        expand_recurrence(base, rule, until)
    }

    /// Expands a stored meeting and persists the generated occurrences.
    ///
    /// `rule` and `until` default to the meeting's own recurrence settings.
    /// Occurrences themselves are never expanded again.
    pub async fn expand_and_persist(
        &self,
        meeting_id: &str,
        rule: Option<RecurrenceRule>,
        until: Option<NaiveDate>,
    ) -> Result<Vec<Meeting>, SchedulingError> {
        let base = self
            .store
            .get_meeting(meeting_id)
            .await?
            .ok_or_else(|| SchedulingError::NotFound(meeting_id.to_string()))?;

        if base.parent_meeting_id.is_some() {
            return Err(SchedulingError::Validation(format!(
                "meeting {} is an occurrence of a series and cannot be expanded",
                meeting_id
            )));
        }

        let rule = rule.unwrap_or(base.recurrence);
        let until = until.or(base.recurrence_end_date);
        if let Some(until) = until.filter(|until| *until < base.date) {
            return Err(SchedulingError::Validation(format!(
                "recurrence end date {} is before the meeting date {}",
                until, base.date
            )));
        }

        let occurrences = expand_recurrence(&base, rule, until);
        let mut stored = Vec::with_capacity(occurrences.len());
        for occurrence in occurrences {
            stored.push(self.store.insert_meeting(occurrence).await?);
        }
        info!(
            "Persisted {} occurrences of meeting {} ({})",
            stored.len(),
            meeting_id,
            rule
        );
        Ok(stored)
    }
}
