//! In-process implementations of the store traits.
//!
//! Used by the backend when no database is configured and by the test suites
//! of the scheduling and calendar crates.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::models::{CredentialRecord, CredentialSource, Meeting};
use crate::services::{BoxFuture, CredentialStore, MeetingStore, StoreError};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
}

/// Meetings kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryMeetingStore {
    meetings: Mutex<Vec<Meeting>>,
}

impl InMemoryMeetingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_meetings(meetings: Vec<Meeting>) -> Self {
        Self {
            meetings: Mutex::new(meetings),
        }
    }

    /// Snapshot of everything stored.
    pub fn all(&self) -> Result<Vec<Meeting>, StoreError> {
        Ok(lock(&self.meetings)?.clone())
    }
}

impl MeetingStore for InMemoryMeetingStore {
    fn meetings_for_user_on(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Meeting>, StoreError> {
        let user_id = user_id.to_string();
        Box::pin(async move {
            let meetings = lock(&self.meetings)?;
            Ok(meetings
                .iter()
                .filter(|m| m.date == date && m.involves(&user_id))
                .cloned()
                .collect())
        })
    }

    fn get_meeting(&self, meeting_id: &str) -> BoxFuture<'_, Option<Meeting>, StoreError> {
        let meeting_id = meeting_id.to_string();
        Box::pin(async move {
            let meetings = lock(&self.meetings)?;
            Ok(meetings.iter().find(|m| m.id == meeting_id).cloned())
        })
    }

    fn insert_meeting(&self, meeting: Meeting) -> BoxFuture<'_, Meeting, StoreError> {
        Box::pin(async move {
            let mut meetings = lock(&self.meetings)?;
            if meetings.iter().any(|m| m.id == meeting.id) {
                return Err(StoreError::Backend(format!(
                    "meeting {} already exists",
                    meeting.id
                )));
            }
            meetings.push(meeting.clone());
            Ok(meeting)
        })
    }

    fn update_meeting(&self, meeting: Meeting) -> BoxFuture<'_, Meeting, StoreError> {
        Box::pin(async move {
            let mut meetings = lock(&self.meetings)?;
            match meetings.iter_mut().find(|m| m.id == meeting.id) {
                Some(existing) => {
                    *existing = meeting.clone();
                    Ok(meeting)
                }
                None => Err(StoreError::NotFound(meeting.id)),
            }
        })
    }

    fn delete_meeting(&self, meeting_id: &str) -> BoxFuture<'_, bool, StoreError> {
        let meeting_id = meeting_id.to_string();
        Box::pin(async move {
            let mut meetings = lock(&self.meetings)?;
            let before = meetings.len();
            meetings.retain(|m| m.id != meeting_id);
            Ok(meetings.len() != before)
        })
    }
}

/// Credentials keyed by user and source.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: Mutex<HashMap<(String, CredentialSource), CredentialRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn get_credentials(
        &self,
        user_id: &str,
        source: CredentialSource,
    ) -> BoxFuture<'_, Option<CredentialRecord>, StoreError> {
        let key = (user_id.to_string(), source);
        Box::pin(async move { Ok(lock(&self.records)?.get(&key).cloned()) })
    }

    fn save_credentials(
        &self,
        user_id: &str,
        source: CredentialSource,
        record: CredentialRecord,
    ) -> BoxFuture<'_, (), StoreError> {
        let key = (user_id.to_string(), source);
        Box::pin(async move {
            lock(&self.records)?.insert(key, record);
            Ok(())
        })
    }

    fn remove_credentials(
        &self,
        user_id: &str,
        source: CredentialSource,
    ) -> BoxFuture<'_, bool, StoreError> {
        let key = (user_id.to_string(), source);
        Box::pin(async move { Ok(lock(&self.records)?.remove(&key).is_some()) })
    }
}
