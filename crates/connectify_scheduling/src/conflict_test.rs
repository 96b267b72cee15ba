#[cfg(test)]
mod tests {
    use crate::conflict::find_conflicts;
    use crate::time_slot::TimeSlot;
    use chrono::{NaiveDate, NaiveTime};
    use connectify_common::models::{Meeting, MeetingStatus};

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn meeting(title: &str, h: u32, m: u32, duration: u32) -> Meeting {
        Meeting::new(
            title,
            "alice",
            NaiveDate::from_ymd_opt(2024, 1, 8).unwrap(),
            at(h, m),
            duration,
        )
    }

    #[test]
    fn adjacent_meeting_is_not_a_conflict() {
        let existing = vec![meeting("Standup", 10, 0, 60)];
        let report = find_conflicts(&existing, TimeSlot::starting_at(at(11, 0), 30), None);
        assert!(!report.has_conflicts);
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn overlapping_meeting_is_reported_with_its_details() {
        let existing = vec![meeting("Standup", 10, 0, 60)];
        let report = find_conflicts(&existing, TimeSlot::starting_at(at(10, 30), 30), None);

        assert!(report.has_conflicts);
        assert_eq!(report.conflicts.len(), 1);
        let conflict = &report.conflicts[0];
        assert_eq!(conflict.id, existing[0].id);
        assert_eq!(conflict.title, "Standup");
        assert_eq!(conflict.time, at(10, 0));
        assert_eq!(conflict.duration, 60);
    }

    #[test]
    fn excluded_meeting_never_conflicts_with_itself() {
        let existing = vec![meeting("Review", 14, 0, 60)];
        let own_slot = TimeSlot::of_meeting(&existing[0]);

        let report = find_conflicts(&existing, own_slot, Some(&existing[0].id));
        assert!(!report.has_conflicts);

        let report = find_conflicts(&existing, own_slot, Some("someone-else"));
        assert!(report.has_conflicts);
    }

    #[test]
    fn cancelled_meetings_are_ignored() {
        let mut cancelled = meeting("Dropped", 9, 0, 120);
        cancelled.status = MeetingStatus::Cancelled;
        let report = find_conflicts(&[cancelled], TimeSlot::starting_at(at(9, 30), 30), None);
        assert!(!report.has_conflicts);
    }

    #[test]
    fn all_overlaps_are_listed_in_order() {
        let existing = vec![
            meeting("A", 9, 0, 60),
            meeting("B", 12, 0, 30),
            meeting("C", 9, 45, 30),
        ];
        let report = find_conflicts(&existing, TimeSlot::starting_at(at(9, 30), 60), None);
        let titles: Vec<_> = report.conflicts.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "C"]);
    }

    #[test]
    fn report_serializes_with_short_times() {
        let existing = vec![meeting("Standup", 10, 0, 60)];
        let report = find_conflicts(&existing, TimeSlot::starting_at(at(10, 15), 15), None);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["has_conflicts"], true);
        assert_eq!(json["conflicts"][0]["time"], "10:00");
        assert_eq!(json["conflicts"][0]["duration"], 60);
    }
}
