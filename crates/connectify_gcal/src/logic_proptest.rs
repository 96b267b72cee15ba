#[cfg(test)]
mod tests {
    use crate::logic::{event_to_meeting, local_to_utc, meeting_to_draft};
    use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
    use chrono_tz::Tz;
    use connectify_common::models::Meeting;
    use connectify_common::services::ExternalEvent;
    use proptest::prelude::*;

    fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..3650).prop_map(|offset| {
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Duration::days(offset)
        })
    }

    fn arb_time() -> impl Strategy<Value = NaiveTime> {
        (0u32..24, 0u32..60).prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
    }

    proptest! {
        #[test]
        fn utc_wall_clock_round_trips(date in arb_date(), time in arb_time()) {
            let instant = local_to_utc(Tz::UTC, date, time).unwrap();
            prop_assert_eq!(instant.date_naive(), date);
            prop_assert_eq!(instant.time(), time);
        }

        #[test]
        fn draft_length_matches_duration(
            date in arb_date(),
            time in arb_time(),
            duration in 1u32..=480,
        ) {
            let meeting = Meeting::new("Sync", "alice", date, time, duration);
            let tz = Tz::America__New_York;
            match meeting_to_draft(&meeting, tz) {
                Ok(draft) => {
                    prop_assert_eq!(draft.end - draft.start, Duration::minutes(i64::from(duration)));
                    let local = draft.start.with_timezone(&tz);
                    prop_assert_eq!(local.date_naive(), date);
                    prop_assert_eq!(local.time(), time);
                }
                // Only times inside the spring-forward gap are rejected.
                Err(_) => prop_assert!(local_to_utc(tz, date, time).is_none()),
            }
        }

        #[test]
        fn imported_durations_are_positive(offset_secs in -7200i64..86_400, start_secs in 0i64..86_400) {
            let start = Utc.timestamp_opt(1_746_000_000 + start_secs, 0).unwrap();
            let event = ExternalEvent {
                id: "evt".to_string(),
                title: "Imported".to_string(),
                description: None,
                start,
                end: start + Duration::seconds(offset_secs),
                attendees: Vec::new(),
                join_link: None,
                canonical_link: None,
                all_day: false,
                status: "confirmed".to_string(),
            };
            let meeting = event_to_meeting(&event, "alice", Tz::UTC);
            prop_assert!(meeting.duration_minutes >= 1);
            prop_assert!(meeting.is_synced());
        }
    }
}
