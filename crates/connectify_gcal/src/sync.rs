// --- File: crates/connectify_gcal/src/sync.rs ---
//! Keeps local meetings and the user's provider calendar in step.
//!
//! Every provider call goes through [`CalendarSynchronizer::call_provider`]:
//! credentials are resolved (calendar source first, login second), a probe
//! checks the access token, and an authorization failure triggers at most one
//! refresh, a single write-back to the source the record came from, and one
//! retry.

use chrono::{Duration as ChronoDuration, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use connectify_common::models::{CredentialRecord, CredentialSource, ExternalLink, Meeting};
use connectify_common::services::{
    BoxFuture, CalendarProvider, CreatedExternalEvent, CredentialStore, ExternalEvent,
    MeetingStore, OAuthProvider, ProviderError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::logic::{event_to_meeting, local_to_utc, meeting_to_draft};
use crate::state::StateSigner;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);

/// What the caller knows about a user's calendar connection.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    pub user_id: String,
    pub connected: bool,
    /// `calendar` or `login`.
    pub source: Option<String>,
    pub has_refresh_token: bool,
}

/// Result of the meeting-level delete flow.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub meeting_id: String,
    pub deleted_locally: bool,
    /// `false` when the meeting was not synced or the provider delete failed.
    pub external_deleted: bool,
}

struct ResolvedCredentials {
    source: CredentialSource,
    record: CredentialRecord,
}

pub struct CalendarSynchronizer {
    meetings: Arc<dyn MeetingStore>,
    credentials: Arc<dyn CredentialStore>,
    provider: Arc<dyn CalendarProvider>,
    oauth: Arc<dyn OAuthProvider>,
    state_signer: StateSigner,
    time_zone: Tz,
    call_timeout: Duration,
}

impl CalendarSynchronizer {
    pub fn new(
        meetings: Arc<dyn MeetingStore>,
        credentials: Arc<dyn CredentialStore>,
        provider: Arc<dyn CalendarProvider>,
        oauth: Arc<dyn OAuthProvider>,
        state_signer: StateSigner,
    ) -> Self {
        Self {
            meetings,
            credentials,
            provider,
            oauth,
            state_signer,
            time_zone: Tz::UTC,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_time_zone(mut self, time_zone: Tz) -> Self {
        self.time_zone = time_zone;
        self
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    // --- OAuth ---

    /// Consent URL whose `state` identifies `user_id` on the way back.
    pub fn get_auth_url(&self, user_id: &str) -> Result<String, SyncError> {
        let user_id = non_empty("user_id", user_id)?;
        let state = self.state_signer.sign(user_id)?;
        Ok(self.oauth.authorization_url(&state))
    }

    pub fn identify_user(&self, state: &str) -> Result<String, SyncError> {
        Ok(self.state_signer.verify(state)?)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<CredentialRecord, SyncError> {
        let code = non_empty("code", code)?;
        let tokens = self.timed(self.oauth.exchange_code(code)).await?;
        CredentialRecord::new(tokens.access_token, tokens.refresh_token, true).ok_or_else(|| {
            SyncError::Provider(ProviderError::Api(
                "token endpoint returned an empty access token".to_string(),
            ))
        })
    }

    pub async fn save_credentials(
        &self,
        user_id: &str,
        record: CredentialRecord,
    ) -> Result<(), SyncError> {
        let user_id = non_empty("user_id", user_id)?;
        self.credentials
            .save_credentials(user_id, CredentialSource::Calendar, record)
            .await?;
        info!("Saved calendar credentials for user {}", user_id);
        Ok(())
    }

    /// The OAuth callback: verify `state`, exchange `code`, store the tokens.
    /// Returns the connected user.
    pub async fn complete_authorization(
        &self,
        code: &str,
        state: &str,
    ) -> Result<String, SyncError> {
        let user_id = self.identify_user(state)?;
        let record = self.exchange_code(code).await?;
        self.save_credentials(&user_id, record).await?;
        Ok(user_id)
    }

    pub async fn connection_status(&self, user_id: &str) -> Result<ConnectionStatus, SyncError> {
        let user_id = non_empty("user_id", user_id)?;
        let resolved = self.find_credentials(user_id).await?;
        Ok(ConnectionStatus {
            user_id: user_id.to_string(),
            connected: resolved.is_some(),
            source: resolved.as_ref().map(|r| r.source.as_str().to_string()),
            has_refresh_token: resolved
                .as_ref()
                .is_some_and(|r| r.record.refresh_token.is_some()),
        })
    }

    /// Drops the dedicated calendar credential. Login credentials are left
    /// alone.
    pub async fn disconnect(&self, user_id: &str) -> Result<bool, SyncError> {
        let user_id = non_empty("user_id", user_id)?;
        let removed = self
            .credentials
            .remove_credentials(user_id, CredentialSource::Calendar)
            .await?;
        if removed {
            info!("Disconnected calendar for user {}", user_id);
        }
        Ok(removed)
    }

    // --- Provider operations ---

    /// Events overlapping the local days `start..=end`.
    pub async fn list_external_events(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExternalEvent>, SyncError> {
        if end < start {
            return Err(SyncError::Validation(format!(
                "end date {} is before start date {}",
                end, start
            )));
        }
        let range_start = self.day_start(start)?;
        let range_end = self.day_start(end + ChronoDuration::days(1))?;

        let events = self
            .call_provider(user_id, |token| {
                self.provider.list_events(token, range_start, range_end)
            })
            .await?;
        debug!(
            "Found {} external events for user {} between {} and {}",
            events.len(),
            user_id,
            start,
            end
        );
        Ok(events)
    }

    pub async fn create_external_event(
        &self,
        user_id: &str,
        meeting: &Meeting,
    ) -> Result<CreatedExternalEvent, SyncError> {
        let draft = meeting_to_draft(meeting, self.time_zone)?;
        self.call_provider(user_id, |token| {
            self.provider.create_event(token, draft.clone())
        })
        .await
    }

    pub async fn update_external_event(
        &self,
        user_id: &str,
        external_id: &str,
        meeting: &Meeting,
    ) -> Result<(), SyncError> {
        let external_id = non_empty("external_id", external_id)?;
        let draft = meeting_to_draft(meeting, self.time_zone)?;
        self.call_provider(user_id, |token| {
            self.provider
                .update_event(token, external_id, draft.clone())
        })
        .await
    }

    pub async fn delete_external_event(
        &self,
        user_id: &str,
        external_id: &str,
    ) -> Result<(), SyncError> {
        let external_id = non_empty("external_id", external_id)?;
        self.call_provider(user_id, |token| {
            self.provider.delete_event(token, external_id)
        })
        .await
    }

    // --- Meeting-level flows ---

    /// Pushes a stored meeting to the provider: created when unsynced,
    /// patched when already synced. The linkage is written back.
    pub async fn sync_meeting(&self, user_id: &str, meeting_id: &str) -> Result<Meeting, SyncError> {
        let mut meeting = self.load_meeting(meeting_id).await?;

        match meeting.external.event_id.clone().filter(|_| meeting.is_synced()) {
            Some(event_id) => {
                self.update_external_event(user_id, &event_id, &meeting)
                    .await?;
                info!("Updated external event {} for meeting {}", event_id, meeting.id);
            }
            None => {
                let created = self.create_external_event(user_id, &meeting).await?;
                info!(
                    "Created external event {} for meeting {}",
                    created.external_id, meeting.id
                );
                meeting.external = ExternalLink {
                    event_id: Some(created.external_id),
                    join_url: created.join_link,
                    calendar_url: created.canonical_link,
                    synced: true,
                };
            }
        }

        Ok(self.meetings.update_meeting(meeting).await?)
    }

    /// Deletes a meeting. The provider delete is best effort; the local
    /// record is removed whatever its outcome.
    pub async fn delete_meeting(
        &self,
        user_id: &str,
        meeting_id: &str,
    ) -> Result<DeleteOutcome, SyncError> {
        let meeting = self.load_meeting(meeting_id).await?;

        let mut external_deleted = false;
        if let Some(event_id) = meeting.external.event_id.as_deref().filter(|_| meeting.is_synced())
        {
            match self.delete_external_event(user_id, event_id).await {
                Ok(()) => external_deleted = true,
                Err(err) => warn!(
                    "Failed to delete external event {} for meeting {}: {}",
                    event_id, meeting.id, err
                ),
            }
        }

        let deleted_locally = self.meetings.delete_meeting(&meeting.id).await?;
        info!("Deleted meeting {}", meeting.id);
        Ok(DeleteOutcome {
            meeting_id: meeting.id,
            deleted_locally,
            external_deleted,
        })
    }

    /// Stores the selected provider events as synced meetings organized by
    /// `user_id`. Ids not found in the range are skipped.
    pub async fn import_events(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        event_ids: &[String],
    ) -> Result<Vec<Meeting>, SyncError> {
        if event_ids.is_empty() {
            return Err(SyncError::Validation(
                "no events selected for import".to_string(),
            ));
        }

        let events = self.list_external_events(user_id, start, end).await?;
        let mut imported = Vec::new();
        for event in events.iter().filter(|e| event_ids.contains(&e.id)) {
            let meeting = event_to_meeting(event, user_id, self.time_zone);
            imported.push(self.meetings.insert_meeting(meeting).await?);
        }

        if imported.len() < event_ids.len() {
            debug!(
                "{} of {} selected events were not found in range",
                event_ids.len() - imported.len(),
                event_ids.len()
            );
        }
        info!("Imported {} events for user {}", imported.len(), user_id);
        Ok(imported)
    }

    // --- Internals ---

    async fn load_meeting(&self, meeting_id: &str) -> Result<Meeting, SyncError> {
        self.meetings
            .get_meeting(meeting_id)
            .await?
            .ok_or_else(|| SyncError::NotFound(format!("meeting {}", meeting_id)))
    }

    fn day_start(&self, date: NaiveDate) -> Result<chrono::DateTime<chrono::Utc>, SyncError> {
        local_to_utc(self.time_zone, date, NaiveTime::default()).ok_or_else(|| {
            SyncError::Validation(format!(
                "midnight of {} does not exist in time zone {}",
                date, self.time_zone
            ))
        })
    }

    async fn find_credentials(
        &self,
        user_id: &str,
    ) -> Result<Option<ResolvedCredentials>, SyncError> {
        for source in [CredentialSource::Calendar, CredentialSource::Login] {
            if let Some(record) = self.credentials.get_credentials(user_id, source).await? {
                return Ok(Some(ResolvedCredentials { source, record }));
            }
        }
        Ok(None)
    }

    async fn resolve_credentials(&self, user_id: &str) -> Result<ResolvedCredentials, SyncError> {
        self.find_credentials(user_id)
            .await?
            .ok_or_else(|| SyncError::NotConnected(user_id.to_string()))
    }

    async fn timed<T>(&self, call: BoxFuture<'_, T, ProviderError>) -> Result<T, ProviderError> {
        match tokio::time::timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout(self.call_timeout.as_secs())),
        }
    }

    /// Exchanges the refresh token and writes the new record back to the
    /// source it was read from. Returns the new access token.
    async fn refresh(
        &self,
        user_id: &str,
        resolved: &ResolvedCredentials,
    ) -> Result<String, SyncError> {
        let Some(refresh_token) = resolved.record.refresh_token.as_deref() else {
            warn!("No refresh token stored for user {}", user_id);
            return Err(SyncError::ReauthRequired(user_id.to_string()));
        };

        let tokens = match self.timed(self.oauth.refresh_access_token(refresh_token)).await {
            Ok(tokens) => tokens,
            Err(err) if err.is_unauthorized() => {
                warn!("Refresh grant rejected for user {}: {}", user_id, err);
                return Err(SyncError::ReauthRequired(user_id.to_string()));
            }
            Err(err) => return Err(err.into()),
        };

        let access_token = tokens.access_token.clone();
        let record = CredentialRecord::new(
            tokens.access_token,
            tokens
                .refresh_token
                .or_else(|| resolved.record.refresh_token.clone()),
            resolved.record.calendar_linked,
        )
        .ok_or_else(|| {
            SyncError::Provider(ProviderError::Api(
                "refresh returned an empty access token".to_string(),
            ))
        })?;

        self.credentials
            .save_credentials(user_id, resolved.source, record)
            .await?;
        info!(
            "Refreshed access token for user {} ({} credentials)",
            user_id,
            resolved.source.as_str()
        );
        Ok(access_token)
    }

    /// Runs `op` with the user's access token, refreshing it at most once.
    async fn call_provider<'a, T, F>(&'a self, user_id: &str, op: F) -> Result<T, SyncError>
    where
        F: Fn(&str) -> BoxFuture<'a, T, ProviderError>,
    {
        let user_id = non_empty("user_id", user_id)?;
        let resolved = self.resolve_credentials(user_id).await?;
        let mut token = resolved.record.access_token.clone();
        let mut refreshed = false;

        match self.timed(self.provider.probe(&token)).await {
            Ok(()) => {}
            Err(err) if err.is_unauthorized() => {
                debug!("Probe rejected the access token for user {}", user_id);
                token = self.refresh(user_id, &resolved).await?;
                refreshed = true;
            }
            Err(err) => return Err(err.into()),
        }

        match self.timed(op(&token)).await {
            Ok(value) => Ok(value),
            Err(err) if err.is_unauthorized() && !refreshed => {
                debug!("Provider rejected the access token for user {}", user_id);
                let token = self.refresh(user_id, &resolved).await?;
                self.timed(op(&token))
                    .await
                    .map_err(|err| reauth_if_unauthorized(user_id, err))
            }
            Err(err) => Err(reauth_if_unauthorized(user_id, err)),
        }
    }
}

fn reauth_if_unauthorized(user_id: &str, err: ProviderError) -> SyncError {
    if err.is_unauthorized() {
        SyncError::ReauthRequired(user_id.to_string())
    } else {
        SyncError::Provider(err)
    }
}

fn non_empty<'v>(field: &str, value: &'v str) -> Result<&'v str, SyncError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(SyncError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed)
}
