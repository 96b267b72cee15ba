//! SQL implementation of the meeting store
//!
//! Dates and times are stored as text (`YYYY-MM-DD`, `HH:MM`) since the `Any`
//! driver has no chrono support; participants are a JSON array.

use crate::error::DbError;
use crate::DbClient;
use chrono::NaiveDate;
use connectify_common::models::{
    hhmm, ExternalLink, Meeting, MeetingStatus, Participant, RecurrenceRule,
};
use connectify_common::services::{BoxFuture, MeetingStore, StoreError};
use sqlx::any::AnyRow;
use sqlx::Row;
use tracing::{debug, error, info, warn};

const DATE_FORMAT: &str = "%Y-%m-%d";

const SELECT_COLUMNS: &str = "SELECT id, title, description, date, start_time, duration_minutes, \
    organizer_id, participants, status, recurrence, recurrence_end_date, parent_meeting_id, \
    external_event_id, external_join_url, external_calendar_url, external_synced FROM meetings";

/// SQL implementation of [`MeetingStore`]
#[derive(Debug, Clone)]
pub struct SqlMeetingRepository {
    db_client: DbClient,
}

impl SqlMeetingRepository {
    pub fn new(db_client: DbClient) -> Self {
        Self { db_client }
    }

    /// Creates the `meetings` table if it doesn't exist
    pub async fn init_schema(&self) -> Result<(), DbError> {
        debug!("Initializing meeting schema");

        let query = r#"
            CREATE TABLE IF NOT EXISTS meetings (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                start_time TEXT NOT NULL,
                duration_minutes INTEGER NOT NULL,
                organizer_id TEXT NOT NULL,
                participants TEXT NOT NULL,
                status TEXT NOT NULL,
                recurrence TEXT NOT NULL,
                recurrence_end_date TEXT,
                parent_meeting_id TEXT,
                external_event_id TEXT,
                external_join_url TEXT,
                external_calendar_url TEXT,
                external_synced INTEGER NOT NULL DEFAULT 0
            )
        "#;
        self.db_client.execute(query).await?;
        self.db_client
            .execute("CREATE INDEX IF NOT EXISTS idx_meetings_date ON meetings (date)")
            .await?;

        info!("Meeting schema initialized successfully");
        Ok(())
    }

    async fn find_on(&self, user_id: &str, date: NaiveDate) -> Result<Vec<Meeting>, StoreError> {
        let query = format!("{} WHERE date = $1 ORDER BY start_time", SELECT_COLUMNS);
        let rows = sqlx::query(&query)
            .bind(date.format(DATE_FORMAT).to_string())
            .fetch_all(self.db_client.pool())
            .await
            .map_err(query_error)?;

        // Participation lives in the JSON column, so the user filter runs here.
        // A row that cannot be read is skipped; it may belong to another user.
        let mut meetings = Vec::with_capacity(rows.len());
        for row in &rows {
            match meeting_from_row(row) {
                Ok(meeting) if meeting.involves(user_id) => meetings.push(meeting),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable meeting row on {}: {}", date, e),
            }
        }
        debug!(
            "Loaded {} meetings for user {} on {}",
            meetings.len(),
            user_id,
            date
        );
        Ok(meetings)
    }

    async fn find_by_id(&self, meeting_id: &str) -> Result<Option<Meeting>, StoreError> {
        let query = format!("{} WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&query)
            .bind(meeting_id.to_string())
            .fetch_optional(self.db_client.pool())
            .await
            .map_err(query_error)?;
        row.as_ref().map(meeting_from_row).transpose()
    }

    async fn insert(&self, meeting: Meeting) -> Result<Meeting, StoreError> {
        let values = MeetingColumns::from_meeting(&meeting)?;
        let query = r#"
            INSERT INTO meetings (
                id, title, description, date, start_time, duration_minutes, organizer_id,
                participants, status, recurrence, recurrence_end_date, parent_meeting_id,
                external_event_id, external_join_url, external_calendar_url, external_synced
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#;

        sqlx::query(query)
            .bind(meeting.id.clone())
            .bind(meeting.title.clone())
            .bind(meeting.description.clone())
            .bind(values.date)
            .bind(values.start_time)
            .bind(values.duration)
            .bind(meeting.organizer_id.clone())
            .bind(values.participants)
            .bind(meeting.status.as_str())
            .bind(meeting.recurrence.as_str())
            .bind(values.recurrence_end_date)
            .bind(meeting.parent_meeting_id.clone())
            .bind(meeting.external.event_id.clone())
            .bind(meeting.external.join_url.clone())
            .bind(meeting.external.calendar_url.clone())
            .bind(values.synced)
            .execute(self.db_client.pool())
            .await
            .map_err(query_error)?;

        info!("Stored meeting {}", meeting.id);
        Ok(meeting)
    }

    async fn update(&self, meeting: Meeting) -> Result<Meeting, StoreError> {
        let values = MeetingColumns::from_meeting(&meeting)?;
        let query = r#"
            UPDATE meetings
            SET title = $1, description = $2, date = $3, start_time = $4,
                duration_minutes = $5, organizer_id = $6, participants = $7, status = $8,
                recurrence = $9, recurrence_end_date = $10, parent_meeting_id = $11,
                external_event_id = $12, external_join_url = $13,
                external_calendar_url = $14, external_synced = $15
            WHERE id = $16
        "#;

        let result = sqlx::query(query)
            .bind(meeting.title.clone())
            .bind(meeting.description.clone())
            .bind(values.date)
            .bind(values.start_time)
            .bind(values.duration)
            .bind(meeting.organizer_id.clone())
            .bind(values.participants)
            .bind(meeting.status.as_str())
            .bind(meeting.recurrence.as_str())
            .bind(values.recurrence_end_date)
            .bind(meeting.parent_meeting_id.clone())
            .bind(meeting.external.event_id.clone())
            .bind(meeting.external.join_url.clone())
            .bind(meeting.external.calendar_url.clone())
            .bind(values.synced)
            .bind(meeting.id.clone())
            .execute(self.db_client.pool())
            .await
            .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("meeting {}", meeting.id)));
        }
        debug!("Updated meeting {}", meeting.id);
        Ok(meeting)
    }

    async fn delete(&self, meeting_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM meetings WHERE id = $1")
            .bind(meeting_id.to_string())
            .execute(self.db_client.pool())
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }
}

impl MeetingStore for SqlMeetingRepository {
    fn meetings_for_user_on(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Meeting>, StoreError> {
        let user_id = user_id.to_string();
        Box::pin(async move { self.find_on(&user_id, date).await })
    }

    fn get_meeting(&self, meeting_id: &str) -> BoxFuture<'_, Option<Meeting>, StoreError> {
        let meeting_id = meeting_id.to_string();
        Box::pin(async move { self.find_by_id(&meeting_id).await })
    }

    fn insert_meeting(&self, meeting: Meeting) -> BoxFuture<'_, Meeting, StoreError> {
        Box::pin(self.insert(meeting))
    }

    fn update_meeting(&self, meeting: Meeting) -> BoxFuture<'_, Meeting, StoreError> {
        Box::pin(self.update(meeting))
    }

    fn delete_meeting(&self, meeting_id: &str) -> BoxFuture<'_, bool, StoreError> {
        let meeting_id = meeting_id.to_string();
        Box::pin(async move { self.delete(&meeting_id).await })
    }
}

/// Column values that need conversion before binding.
struct MeetingColumns {
    date: String,
    start_time: String,
    duration: i64,
    participants: String,
    recurrence_end_date: Option<String>,
    synced: i64,
}

impl MeetingColumns {
    fn from_meeting(meeting: &Meeting) -> Result<Self, StoreError> {
        let participants = serde_json::to_string(&meeting.participants)
            .map_err(|e| StoreError::Backend(format!("Failed to encode participants: {}", e)))?;
        Ok(Self {
            date: meeting.date.format(DATE_FORMAT).to_string(),
            start_time: meeting.start_time.format("%H:%M").to_string(),
            duration: i64::from(meeting.duration_minutes),
            participants,
            recurrence_end_date: meeting
                .recurrence_end_date
                .map(|d| d.format(DATE_FORMAT).to_string()),
            synced: i64::from(meeting.external.synced),
        })
    }
}

fn query_error(err: sqlx::Error) -> StoreError {
    error!("Meeting query failed: {}", err);
    DbError::from(err).into()
}

fn corrupt(column: &str, detail: impl std::fmt::Display) -> StoreError {
    StoreError::Corrupt(format!("meetings.{}: {}", column, detail))
}

fn text(row: &AnyRow, column: &str) -> Result<String, StoreError> {
    row.try_get::<String, _>(column)
        .map_err(|e| corrupt(column, e))
}

fn optional_text(row: &AnyRow, column: &str) -> Result<Option<String>, StoreError> {
    super::optional_text(row, column).map_err(|e| corrupt(column, e))
}

fn parse_date(column: &str, raw: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| corrupt(column, e))
}

fn meeting_from_row(row: &AnyRow) -> Result<Meeting, StoreError> {
    let date = parse_date("date", &text(row, "date")?)?;
    let start_time = hhmm::parse(&text(row, "start_time")?).map_err(|e| corrupt("start_time", e))?;
    let duration: i64 = row
        .try_get("duration_minutes")
        .map_err(|e| corrupt("duration_minutes", e))?;
    let duration_minutes = u32::try_from(duration).map_err(|e| corrupt("duration_minutes", e))?;
    let participants: Vec<Participant> = serde_json::from_str(&text(row, "participants")?)
        .map_err(|e| corrupt("participants", e))?;
    let status: MeetingStatus = text(row, "status")?
        .parse()
        .map_err(|e: String| corrupt("status", e))?;
    let recurrence_end_date = optional_text(row, "recurrence_end_date")?
        .map(|raw| parse_date("recurrence_end_date", &raw))
        .transpose()?;
    let synced: i64 = row
        .try_get("external_synced")
        .map_err(|e| corrupt("external_synced", e))?;

    Ok(Meeting {
        id: text(row, "id")?,
        title: text(row, "title")?,
        description: optional_text(row, "description")?,
        date,
        start_time,
        duration_minutes,
        organizer_id: text(row, "organizer_id")?,
        participants,
        status,
        recurrence: RecurrenceRule::parse_lenient(&text(row, "recurrence")?),
        recurrence_end_date,
        parent_meeting_id: optional_text(row, "parent_meeting_id")?,
        external: ExternalLink {
            event_id: optional_text(row, "external_event_id")?,
            join_url: optional_text(row, "external_join_url")?,
            calendar_url: optional_text(row, "external_calendar_url")?,
            synced: synced != 0,
        },
    })
}
