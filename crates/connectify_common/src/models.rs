// --- File: crates/connectify_common/src/models.rs ---

//! Domain records shared by the scheduling engine, the calendar
//! synchronizer and the storage crates.
//!
//! Times are naive wall-clock values in the single process-wide time zone
//! configured under `scheduling.time_zone`.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// RSVP state of a participant.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RsvpStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Tentative,
}

impl RsvpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RsvpStatus::Pending => "pending",
            RsvpStatus::Accepted => "accepted",
            RsvpStatus::Declined => "declined",
            RsvpStatus::Tentative => "tentative",
        }
    }

    /// Maps a provider `responseStatus` onto a local RSVP state.
    pub fn from_provider(status: Option<&str>) -> Self {
        match status {
            Some("accepted") => RsvpStatus::Accepted,
            Some("declined") => RsvpStatus::Declined,
            Some("tentative") => RsvpStatus::Tentative,
            _ => RsvpStatus::Pending,
        }
    }
}

/// Lifecycle state of a meeting.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MeetingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingStatus::Scheduled => "scheduled",
            MeetingStatus::InProgress => "in-progress",
            MeetingStatus::Completed => "completed",
            MeetingStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for MeetingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MeetingStatus::Scheduled),
            "in-progress" => Ok(MeetingStatus::InProgress),
            "completed" => Ok(MeetingStatus::Completed),
            "cancelled" => Ok(MeetingStatus::Cancelled),
            other => Err(format!("unknown meeting status '{}'", other)),
        }
    }
}

/// How a meeting repeats.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RecurrenceRule {
    #[default]
    OneTime,
    Daily,
    Weekly,
    BiWeekly,
    Monthly,
}

impl RecurrenceRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceRule::OneTime => "one-time",
            RecurrenceRule::Daily => "daily",
            RecurrenceRule::Weekly => "weekly",
            RecurrenceRule::BiWeekly => "bi-weekly",
            RecurrenceRule::Monthly => "monthly",
        }
    }

    /// Parses a rule name; anything unrecognized is treated as one-time so it
    /// never expands.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => RecurrenceRule::Daily,
            "weekly" => RecurrenceRule::Weekly,
            "bi-weekly" | "biweekly" | "bi_weekly" => RecurrenceRule::BiWeekly,
            "monthly" => RecurrenceRule::Monthly,
            _ => RecurrenceRule::OneTime,
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person invited to a meeting. `user_id` is absent for external guests.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: Option<String>,
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub rsvp: RsvpStatus,
}

/// Linkage between a local meeting and its provider event.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExternalLink {
    pub event_id: Option<String>,
    pub join_url: Option<String>,
    pub calendar_url: Option<String>,
    #[serde(default)]
    pub synced: bool,
}

/// A meeting record as owned by the meeting store.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date", example = "2025-05-05"))]
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "10:30"))]
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub organizer_id: String,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub status: MeetingStatus,
    #[serde(default)]
    pub recurrence: RecurrenceRule,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub recurrence_end_date: Option<NaiveDate>,
    pub parent_meeting_id: Option<String>,
    #[serde(default)]
    pub external: ExternalLink,
}

impl Meeting {
    /// Creates a scheduled, one-time meeting with a fresh id.
    pub fn new(
        title: impl Into<String>,
        organizer_id: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_minutes: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            date,
            start_time,
            duration_minutes,
            organizer_id: organizer_id.into(),
            participants: Vec::new(),
            status: MeetingStatus::Scheduled,
            recurrence: RecurrenceRule::OneTime,
            recurrence_end_date: None,
            parent_meeting_id: None,
            external: ExternalLink::default(),
        }
    }

    /// Minutes since midnight of the start time.
    pub fn start_minutes(&self) -> u32 {
        minutes_of_day(self.start_time)
    }

    /// Minutes since midnight of the end; may pass 1440 for late meetings.
    pub fn end_minutes(&self) -> u32 {
        self.start_minutes() + self.duration_minutes
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == MeetingStatus::Cancelled
    }

    /// True when the user organizes the meeting or is listed as a participant.
    pub fn involves(&self, user_id: &str) -> bool {
        self.organizer_id == user_id
            || self
                .participants
                .iter()
                .any(|p| p.user_id.as_deref() == Some(user_id))
    }

    pub fn is_synced(&self) -> bool {
        self.external.synced && self.external.event_id.is_some()
    }
}

/// Minutes elapsed since midnight for a wall-clock time.
pub fn minutes_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Where a credential record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// Dedicated credential granted through the calendar connect flow.
    Calendar,
    /// General sign-in credential, used when no calendar credential exists.
    Login,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialSource::Calendar => "calendar",
            CredentialSource::Login => "login",
        }
    }
}

/// OAuth tokens stored for a user.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub calendar_linked: bool,
}

impl CredentialRecord {
    /// Returns `None` for an empty access token: a stored record always has one.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        calendar_linked: bool,
    ) -> Option<Self> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return None;
        }
        Some(Self {
            access_token,
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            calendar_linked,
        })
    }
}

// Tokens stay out of logs.
impl fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("calendar_linked", &self.calendar_linked)
            .finish()
    }
}

/// Serde helpers for `HH:MM` wall-clock times. Seconds are accepted on input.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    /// Parses `HH:MM` or `HH:MM:SS`.
    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting_at(h: u32, m: u32, duration: u32) -> Meeting {
        Meeting::new(
            "Standup",
            "alice",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            duration,
        )
    }

    #[test]
    fn end_is_derived_from_start_and_duration() {
        let mut meeting = meeting_at(10, 15, 45);
        assert_eq!(meeting.start_minutes(), 615);
        assert_eq!(meeting.end_minutes(), 660);

        meeting.duration_minutes = 90;
        assert_eq!(meeting.end_minutes(), 705);
    }

    #[test]
    fn involves_organizer_and_linked_participants_only() {
        let mut meeting = meeting_at(9, 0, 30);
        meeting.participants.push(Participant {
            user_id: Some("bob".to_string()),
            name: "Bob".to_string(),
            email: None,
            rsvp: RsvpStatus::Accepted,
        });
        meeting.participants.push(Participant {
            user_id: None,
            name: "Guest".to_string(),
            email: Some("guest@example.com".to_string()),
            rsvp: RsvpStatus::Pending,
        });

        assert!(meeting.involves("alice"));
        assert!(meeting.involves("bob"));
        assert!(!meeting.involves("guest@example.com"));
    }

    #[test]
    fn unknown_recurrence_is_one_time() {
        assert_eq!(RecurrenceRule::parse_lenient("weekly"), RecurrenceRule::Weekly);
        assert_eq!(RecurrenceRule::parse_lenient("bi-weekly"), RecurrenceRule::BiWeekly);
        assert_eq!(RecurrenceRule::parse_lenient("yearly"), RecurrenceRule::OneTime);
        assert_eq!(RecurrenceRule::parse_lenient(""), RecurrenceRule::OneTime);
    }

    #[test]
    fn empty_access_token_is_rejected() {
        assert!(CredentialRecord::new("", Some("refresh".to_string()), true).is_none());
        let record = CredentialRecord::new("token", Some(String::new()), false).unwrap();
        assert!(record.refresh_token.is_none());
    }

    #[test]
    fn meeting_json_uses_short_times() {
        let meeting = meeting_at(14, 5, 30);
        let json = serde_json::to_value(&meeting).unwrap();
        assert_eq!(json["start_time"], "14:05");
        assert_eq!(json["recurrence"], "one-time");
        assert_eq!(json["status"], "scheduled");

        let back: Meeting = serde_json::from_value(json).unwrap();
        assert_eq!(back, meeting);
    }

    #[test]
    fn credential_debug_hides_tokens() {
        let record = CredentialRecord::new("secret-token", None, true).unwrap();
        let printed = format!("{:?}", record);
        assert!(!printed.contains("secret-token"));
    }
}
