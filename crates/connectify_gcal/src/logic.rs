// --- File: crates/connectify_gcal/src/logic.rs ---
//! Pure conversions between local meetings and Google Calendar events.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use connectify_common::models::{
    ExternalLink, Meeting, MeetingStatus, Participant, RsvpStatus,
};
use connectify_common::services::{
    ExternalAttendee, ExternalEvent, ExternalEventDraft, ProviderError,
};
use google_calendar3::api::{
    ConferenceData, ConferenceSolutionKey, CreateConferenceRequest, Event, EventAttendee,
    EventDateTime,
};
use tracing::debug;
use uuid::Uuid;

use crate::error::SyncError;

pub fn parse_time_zone(name: &str) -> Result<Tz, String> {
    name.parse::<Tz>()
        .map_err(|e| format!("Unknown time zone '{}': {}", name, e))
}

/// Wall-clock date and time in `tz` as an instant. Ambiguous times (DST
/// fold) resolve to the earlier instant; nonexistent ones (DST gap) yield
/// `None`.
pub fn local_to_utc(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&NaiveDateTime::new(date, time))
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn rsvp_to_provider(rsvp: RsvpStatus) -> &'static str {
    match rsvp {
        RsvpStatus::Pending => "needsAction",
        RsvpStatus::Accepted => "accepted",
        RsvpStatus::Declined => "declined",
        RsvpStatus::Tentative => "tentative",
    }
}

/// Provider-side shape of a meeting. Participants without an email cannot be
/// invited and are left out.
pub fn meeting_to_draft(meeting: &Meeting, tz: Tz) -> Result<ExternalEventDraft, SyncError> {
    let start = local_to_utc(tz, meeting.date, meeting.start_time).ok_or_else(|| {
        SyncError::Validation(format!(
            "{} {} does not exist in time zone {}",
            meeting.date,
            meeting.start_time.format("%H:%M"),
            tz
        ))
    })?;
    let end = start + Duration::minutes(i64::from(meeting.duration_minutes));

    let attendees = meeting
        .participants
        .iter()
        .filter_map(|p| {
            p.email.as_ref().map(|email| ExternalAttendee {
                email: Some(email.clone()),
                name: Some(p.name.clone()),
                response_status: Some(rsvp_to_provider(p.rsvp).to_string()),
            })
        })
        .collect();

    Ok(ExternalEventDraft {
        summary: meeting.title.clone(),
        description: meeting.description.clone(),
        start,
        end,
        time_zone: tz.name().to_string(),
        attendees,
        request_conference: true,
    })
}

/// The Google event sent on insert or patch.
pub fn build_event(draft: &ExternalEventDraft) -> Event {
    let attendees: Vec<EventAttendee> = draft
        .attendees
        .iter()
        .map(|a| EventAttendee {
            email: a.email.clone(),
            display_name: a.name.clone(),
            response_status: a.response_status.clone(),
            ..Default::default()
        })
        .collect();

    let conference_data = draft.request_conference.then(|| ConferenceData {
        create_request: Some(CreateConferenceRequest {
            request_id: Some(Uuid::new_v4().to_string()),
            conference_solution_key: Some(ConferenceSolutionKey {
                type_: Some("hangoutsMeet".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    });

    Event {
        summary: Some(draft.summary.clone()),
        description: draft.description.clone(),
        start: Some(EventDateTime {
            date_time: Some(draft.start),
            time_zone: Some(draft.time_zone.clone()),
            ..Default::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(draft.end),
            time_zone: Some(draft.time_zone.clone()),
            ..Default::default()
        }),
        attendees: (!attendees.is_empty()).then_some(attendees),
        conference_data,
        ..Default::default()
    }
}

/// Conferencing link of an event: the Meet link, else the first video entry point.
pub fn join_link(event: &Event) -> Option<String> {
    event.hangout_link.clone().or_else(|| {
        event
            .conference_data
            .as_ref()?
            .entry_points
            .as_ref()?
            .iter()
            .find(|ep| ep.entry_point_type.as_deref() == Some("video"))
            .and_then(|ep| ep.uri.clone())
    })
}

fn event_instant(value: &EventDateTime, tz: Tz) -> Option<(DateTime<Utc>, bool)> {
    if let Some(date_time) = value.date_time {
        return Some((date_time, false));
    }
    let date = value.date?;
    local_to_utc(tz, date, NaiveTime::default()).map(|dt| (dt, true))
}

/// Maps a listed event for import. Events without id or times are skipped.
pub fn map_event(event: Event, tz: Tz) -> Option<ExternalEvent> {
    let Some(id) = event.id.clone() else {
        debug!("Skipping provider event without id");
        return None;
    };
    let (start, all_day) = event_instant(event.start.as_ref()?, tz)?;
    let (end, _) = event_instant(event.end.as_ref()?, tz)?;

    let attendees = event
        .attendees
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|a| ExternalAttendee {
            email: a.email.clone(),
            name: a.display_name.clone(),
            response_status: a.response_status.clone(),
        })
        .collect();

    Some(ExternalEvent {
        join_link: join_link(&event),
        canonical_link: event.html_link.clone(),
        title: event.summary.clone().unwrap_or_else(|| "(no title)".to_string()),
        description: event.description.clone(),
        status: event.status.clone().unwrap_or_else(|| "confirmed".to_string()),
        id,
        start,
        end,
        attendees,
        all_day,
    })
}

/// A synced local meeting organized by `user_id` for an imported event.
pub fn event_to_meeting(event: &ExternalEvent, user_id: &str, tz: Tz) -> Meeting {
    let local_start = event.start.with_timezone(&tz);
    let start_time = local_start
        .time()
        .with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or_default();
    let minutes = (event.end - event.start).num_minutes().max(1);
    let duration_minutes = u32::try_from(minutes).unwrap_or(u32::MAX);

    let participants = event
        .attendees
        .iter()
        .map(|a| Participant {
            user_id: None,
            name: a
                .name
                .clone()
                .or_else(|| a.email.clone())
                .unwrap_or_else(|| "Guest".to_string()),
            email: a.email.clone(),
            rsvp: RsvpStatus::from_provider(a.response_status.as_deref()),
        })
        .collect();

    let mut meeting = Meeting::new(
        event.title.clone(),
        user_id,
        local_start.date_naive(),
        start_time,
        duration_minutes,
    );
    meeting.description = event.description.clone();
    meeting.participants = participants;
    if event.status == "cancelled" {
        meeting.status = MeetingStatus::Cancelled;
    }
    meeting.external = ExternalLink {
        event_id: Some(event.id.clone()),
        join_url: event.join_link.clone(),
        calendar_url: event.canonical_link.clone(),
        synced: true,
    };
    meeting
}

fn error_code(body: &serde_json::Value) -> Option<u64> {
    body.get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_u64())
}

/// Sorts a Google API failure into the provider error kinds the
/// synchronizer acts on.
pub fn classify_error(err: google_calendar3::Error) -> ProviderError {
    use google_calendar3::Error;

    match err {
        Error::BadRequest(body) => match error_code(&body) {
            Some(401) => ProviderError::Unauthorized(body.to_string()),
            Some(404) | Some(410) => ProviderError::NotFound(body.to_string()),
            _ => ProviderError::Api(body.to_string()),
        },
        Error::Failure(response) => {
            let status = response.status().as_u16();
            match status {
                401 => ProviderError::Unauthorized(format!("provider returned {}", status)),
                404 | 410 => ProviderError::NotFound(format!("provider returned {}", status)),
                _ => ProviderError::Api(format!("provider returned {}", status)),
            }
        }
        Error::MissingToken(e) => ProviderError::Unauthorized(e.to_string()),
        Error::HttpError(e) => ProviderError::Transport(e.to_string()),
        Error::Io(e) => ProviderError::Transport(e.to_string()),
        other => ProviderError::Api(other.to_string()),
    }
}
