#[cfg(test)]
mod tests {
    use crate::availability::{calculate_available_slots, WorkingHours};
    use crate::recurrence::{expand_recurrence, MAX_OCCURRENCES};
    use crate::time_slot::TimeSlot;
    use chrono::{NaiveDate, NaiveTime};
    use connectify_common::models::{Meeting, RecurrenceRule};
    use proptest::prelude::*;

    fn slot_strategy() -> impl Strategy<Value = TimeSlot> {
        (0u32..1440, 0u32..600).prop_map(|(start, duration)| TimeSlot::new(start, duration))
    }

    fn rule_strategy() -> impl Strategy<Value = RecurrenceRule> {
        prop_oneof![
            Just(RecurrenceRule::OneTime),
            Just(RecurrenceRule::Daily),
            Just(RecurrenceRule::Weekly),
            Just(RecurrenceRule::BiWeekly),
            Just(RecurrenceRule::Monthly),
        ]
    }

    proptest! {
        // Overlap is symmetric
        #[test]
        fn test_overlap_is_symmetric(a in slot_strategy(), b in slot_strategy()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        // Intervals that merely touch never overlap
        #[test]
        fn test_touching_never_overlaps(start in 0u32..1200, first in 1u32..240, second in 1u32..240) {
            let a = TimeSlot::new(start, first);
            let b = TimeSlot::new(a.end, second);
            prop_assert!(!a.overlaps(&b));
        }

        // Every returned slot is inside working hours, has the requested
        // length and is clear of every busy interval
        #[test]
        fn test_slots_respect_hours_and_busy_periods(
            busy in prop::collection::vec(slot_strategy(), 0..8),
            duration in 1u32..300,
            work_start_hour in 0u32..12,
            work_end_hour in 12u32..24,
            granularity in prop::sample::select(vec![5u32, 10, 15, 30, 60]),
        ) {
            let hours = WorkingHours {
                start: work_start_hour * 60,
                end: work_end_hour.min(23) * 60,
                granularity,
            };
            let slots = calculate_available_slots(&busy, duration, hours);

            for slot in &slots {
                let interval = slot.slot();
                prop_assert!(interval.start >= hours.start);
                prop_assert!(interval.end <= hours.end);
                prop_assert_eq!(interval.duration(), duration);
                prop_assert_eq!((interval.start - hours.start) % granularity, 0);
                prop_assert!(busy.iter().all(|b| !b.overlaps(&interval)));
            }
            prop_assert!(slots.windows(2).all(|w| w[0].start < w[1].start));
        }

        // Expansion never exceeds the cap, never passes `until` and never
        // includes the base date
        #[test]
        fn test_expansion_bounds(
            rule in rule_strategy(),
            base_offset in 0i64..3000,
            until_offset in -30i64..2000,
        ) {
            let origin = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
            let base_date = origin + chrono::Duration::days(base_offset);
            let until = base_date + chrono::Duration::days(until_offset);
            let base = Meeting::new(
                "Series",
                "alice",
                base_date,
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                30,
            );

            let occurrences = expand_recurrence(&base, rule, Some(until));
            prop_assert!(occurrences.len() <= MAX_OCCURRENCES);
            for occurrence in &occurrences {
                prop_assert!(occurrence.date > base.date);
                prop_assert!(occurrence.date <= until);
                prop_assert_ne!(&occurrence.id, &base.id);
            }
            prop_assert!(occurrences.windows(2).all(|w| w[0].date < w[1].date));
        }
    }
}
