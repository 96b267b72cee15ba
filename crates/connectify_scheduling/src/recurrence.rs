// --- File: crates/connectify_scheduling/src/recurrence.rs ---
//! Expansion of a recurring meeting into concrete occurrences.

use chrono::{Days, Months, NaiveDate};
use connectify_common::models::{ExternalLink, Meeting, RecurrenceRule};
use tracing::debug;
use uuid::Uuid;

/// Upper bound on generated occurrences per expansion.
pub const MAX_OCCURRENCES: usize = 52;

/// Date of the `n`th occurrence after `base` (n >= 1).
///
/// Monthly steps are taken from the base date each time (`base + n months`)
/// rather than by adding one month to the previous occurrence. A series that
/// starts on the 31st therefore lands on the last day of shorter months and
/// returns to the 31st afterwards (Jan 31, Feb 29, Mar 31), where iterative
/// stepping would drift to Mar 29.
pub fn occurrence_date(base: NaiveDate, rule: RecurrenceRule, n: u32) -> Option<NaiveDate> {
    match rule {
        RecurrenceRule::OneTime => None,
        RecurrenceRule::Daily => base.checked_add_days(Days::new(u64::from(n))),
        RecurrenceRule::Weekly => base.checked_add_days(Days::new(7 * u64::from(n))),
        RecurrenceRule::BiWeekly => base.checked_add_days(Days::new(14 * u64::from(n))),
        RecurrenceRule::Monthly => base.checked_add_months(Months::new(n)),
    }
}

/// Generates the occurrences of `base` under `rule`, up to and including
/// `until` (unbounded when `None`) and at most [`MAX_OCCURRENCES`].
///
/// The base itself is never part of the output. Each occurrence is a copy
/// of the base with a fresh id, the advanced date, `parent_meeting_id` set
/// to the base id, and no external linkage. Nothing is persisted here.
pub fn expand_recurrence(
    base: &Meeting,
    rule: RecurrenceRule,
    until: Option<NaiveDate>,
) -> Vec<Meeting> {
    let mut occurrences = Vec::new();

    for n in 1..=MAX_OCCURRENCES as u32 {
        let Some(date) = occurrence_date(base.date, rule, n) else {
            break;
        };
        if until.is_some_and(|until| date > until) {
            break;
        }
        occurrences.push(Meeting {
            id: Uuid::new_v4().to_string(),
            date,
            parent_meeting_id: Some(base.id.clone()),
            external: ExternalLink::default(),
            ..base.clone()
        });
    }

    debug!(
        "Expanded meeting {} ({}) into {} occurrences",
        base.id,
        rule,
        occurrences.len()
    );
    occurrences
}
