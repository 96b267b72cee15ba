// --- File: crates/connectify_common/src/services.rs ---
//! Service abstractions for storage and the external calendar provider.
//!
//! The scheduling engine and the calendar synchronizer only see these traits.
//! Concrete stores live in `connectify_db` (SQL) and [`crate::memory`]
//! (in-process); the Google implementation of the provider traits lives in
//! `connectify_gcal`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

use crate::models::{CredentialRecord, CredentialSource, Meeting};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Errors raised by a meeting or credential store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Store backend error: {0}")]
    Backend(String),
    #[error("Stored record is corrupt: {0}")]
    Corrupt(String),
}

/// Errors raised by the calendar provider or its OAuth endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The access token was rejected, or a refresh grant was refused.
    #[error("Provider rejected the credentials: {0}")]
    Unauthorized(String),
    #[error("Provider resource not found: {0}")]
    NotFound(String),
    #[error("Provider call timed out after {0} seconds")]
    Timeout(u64),
    #[error("Provider API error: {0}")]
    Api(String),
    #[error("Provider transport error: {0}")]
    Transport(String),
}

impl ProviderError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ProviderError::Unauthorized(_))
    }
}

/// Persistent collection of meetings. CRUD only.
pub trait MeetingStore: Send + Sync {
    /// All meetings on `date` that the user organizes or participates in,
    /// cancelled ones included.
    fn meetings_for_user_on(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> BoxFuture<'_, Vec<Meeting>, StoreError>;

    fn get_meeting(&self, meeting_id: &str) -> BoxFuture<'_, Option<Meeting>, StoreError>;

    fn insert_meeting(&self, meeting: Meeting) -> BoxFuture<'_, Meeting, StoreError>;

    /// Replaces an existing meeting; `StoreError::NotFound` when it is absent.
    fn update_meeting(&self, meeting: Meeting) -> BoxFuture<'_, Meeting, StoreError>;

    /// Returns `false` when nothing was deleted.
    fn delete_meeting(&self, meeting_id: &str) -> BoxFuture<'_, bool, StoreError>;
}

/// Per-user OAuth credentials, one record per [`CredentialSource`].
pub trait CredentialStore: Send + Sync {
    fn get_credentials(
        &self,
        user_id: &str,
        source: CredentialSource,
    ) -> BoxFuture<'_, Option<CredentialRecord>, StoreError>;

    /// Writes the whole record in one operation.
    fn save_credentials(
        &self,
        user_id: &str,
        source: CredentialSource,
        record: CredentialRecord,
    ) -> BoxFuture<'_, (), StoreError>;

    fn remove_credentials(
        &self,
        user_id: &str,
        source: CredentialSource,
    ) -> BoxFuture<'_, bool, StoreError>;
}

/// An attendee on a provider event.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalAttendee {
    pub email: Option<String>,
    pub name: Option<String>,
    pub response_status: Option<String>,
}

/// The shape of an event sent to the provider on create or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalEventDraft {
    pub summary: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// IANA name of the zone the wall-clock times were expressed in.
    pub time_zone: String,
    pub attendees: Vec<ExternalAttendee>,
    /// Ask the provider to generate a conferencing link.
    pub request_conference: bool,
}

/// What the provider returns after creating an event.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedExternalEvent {
    pub external_id: String,
    pub join_link: Option<String>,
    pub canonical_link: Option<String>,
}

/// A provider event mapped for import. Never persisted as is.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalEvent {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub start: DateTime<Utc>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = DateTime))]
    pub end: DateTime<Utc>,
    pub attendees: Vec<ExternalAttendee>,
    pub join_link: Option<String>,
    pub canonical_link: Option<String>,
    pub all_day: bool,
    pub status: String,
}

/// Tokens returned by a code exchange or a refresh grant.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"<redacted>")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Calendar operations against the provider. Every call receives the access
/// token to use; implementations keep no per-user state.
pub trait CalendarProvider: Send + Sync {
    /// Cheap call used only to test whether `access_token` is accepted.
    fn probe(&self, access_token: &str) -> BoxFuture<'_, (), ProviderError>;

    fn create_event(
        &self,
        access_token: &str,
        event: ExternalEventDraft,
    ) -> BoxFuture<'_, CreatedExternalEvent, ProviderError>;

    fn update_event(
        &self,
        access_token: &str,
        external_id: &str,
        event: ExternalEventDraft,
    ) -> BoxFuture<'_, (), ProviderError>;

    fn delete_event(&self, access_token: &str, external_id: &str)
        -> BoxFuture<'_, (), ProviderError>;

    fn list_events(
        &self,
        access_token: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<ExternalEvent>, ProviderError>;
}

/// The provider's OAuth endpoints.
pub trait OAuthProvider: Send + Sync {
    /// Consent URL carrying the given opaque `state`.
    fn authorization_url(&self, state: &str) -> String;

    fn exchange_code(&self, code: &str) -> BoxFuture<'_, OAuthTokens, ProviderError>;

    fn refresh_access_token(&self, refresh_token: &str)
        -> BoxFuture<'_, OAuthTokens, ProviderError>;
}
