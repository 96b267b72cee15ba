#[cfg(test)]
mod tests {
    use crate::error::SyncError;
    use crate::service::mock::{MockCalendarProvider, MockOAuthProvider};
    use crate::state::StateSigner;
    use crate::sync::CalendarSynchronizer;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use connectify_common::memory::{InMemoryCredentialStore, InMemoryMeetingStore};
    use connectify_common::models::{CredentialRecord, CredentialSource, Meeting};
    use connectify_common::services::{CredentialStore, ExternalEvent, MeetingStore, ProviderError};
    use std::sync::Arc;
    use std::time::Duration;

    const SECRET: &str = "test-state-secret";

    struct Fixture {
        sync: CalendarSynchronizer,
        meetings: Arc<InMemoryMeetingStore>,
        credentials: Arc<InMemoryCredentialStore>,
        provider: Arc<MockCalendarProvider>,
        oauth: Arc<MockOAuthProvider>,
    }

    impl Fixture {
        fn new(provider: MockCalendarProvider, oauth: MockOAuthProvider) -> Self {
            let meetings = Arc::new(InMemoryMeetingStore::new());
            let credentials = Arc::new(InMemoryCredentialStore::new());
            let provider = Arc::new(provider);
            let oauth = Arc::new(oauth);
            let sync = CalendarSynchronizer::new(
                meetings.clone(),
                credentials.clone(),
                provider.clone(),
                oauth.clone(),
                StateSigner::new(SECRET, 600),
            );
            Self {
                sync,
                meetings,
                credentials,
                provider,
                oauth,
            }
        }

        fn with_call_timeout(mut self, timeout: Duration) -> Self {
            self.sync = self.sync.with_call_timeout(timeout);
            self
        }

        async fn connect(&self, source: CredentialSource, access: &str, refresh: Option<&str>) {
            let record =
                CredentialRecord::new(access, refresh.map(str::to_string), true).unwrap();
            self.credentials
                .save_credentials("alice", source, record)
                .await
                .unwrap();
        }

        async fn stored(&self, source: CredentialSource) -> Option<CredentialRecord> {
            self.credentials.get_credentials("alice", source).await.unwrap()
        }

        async fn store_meeting(&self) -> Meeting {
            self.meetings.insert_meeting(review()).await.unwrap()
        }
    }

    fn review() -> Meeting {
        Meeting::new(
            "Design review",
            "alice",
            NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
            NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            45,
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_once_and_persisted() {
        let f = Fixture::new(
            MockCalendarProvider::accepting(&["access-1"]),
            MockOAuthProvider::accepting_refresh(&["refresh-a"]),
        );
        f.connect(CredentialSource::Calendar, "expired", Some("refresh-a"))
            .await;

        let created = f.sync.create_external_event("alice", &review()).await.unwrap();

        assert_eq!(created.external_id, "evt-1");
        assert!(created.join_link.is_some());
        assert_eq!(f.oauth.refresh_calls(), 1);
        assert_eq!(
            f.provider.calls(),
            vec!["probe:expired".to_string(), "create:access-1".to_string()]
        );

        let stored = f.stored(CredentialSource::Calendar).await.unwrap();
        assert_eq!(stored.access_token, "access-1");
        assert_eq!(stored.refresh_token.as_deref(), Some("refresh-a"));
    }

    #[tokio::test]
    async fn call_rejected_after_a_good_probe_is_retried_once() {
        let f = Fixture::new(
            MockCalendarProvider::accepting(&["current", "access-1"]),
            MockOAuthProvider::accepting_refresh(&["refresh-a"]),
        );
        f.connect(CredentialSource::Calendar, "current", Some("refresh-a"))
            .await;
        f.provider
            .fail_next(ProviderError::Unauthorized("revoked mid-call".to_string()));

        f.sync.create_external_event("alice", &review()).await.unwrap();

        assert_eq!(f.oauth.refresh_calls(), 1);
        assert_eq!(f.provider.calls_named("create"), 2);
        assert_eq!(
            f.stored(CredentialSource::Calendar).await.unwrap().access_token,
            "access-1"
        );
    }

    #[tokio::test]
    async fn second_rejection_requires_reauthorization() {
        let f = Fixture::new(
            MockCalendarProvider::accepting(&["access-1"]),
            MockOAuthProvider::accepting_refresh(&["refresh-a"]),
        );
        f.connect(CredentialSource::Calendar, "expired", Some("refresh-a"))
            .await;
        f.provider
            .fail_next(ProviderError::Unauthorized("still no".to_string()));

        let result = f.sync.create_external_event("alice", &review()).await;

        assert!(matches!(result, Err(SyncError::ReauthRequired(user)) if user == "alice"));
        assert_eq!(f.oauth.refresh_calls(), 1);
        assert_eq!(f.provider.calls_named("create"), 1);
    }

    #[tokio::test]
    async fn missing_refresh_token_fails_fast() {
        let f = Fixture::new(
            MockCalendarProvider::accepting(&["access-1"]),
            MockOAuthProvider::accepting_refresh(&["refresh-a"]),
        );
        f.connect(CredentialSource::Calendar, "expired", None).await;

        let result = f.sync.list_external_events("alice", day(5), day(5)).await;

        assert!(matches!(result, Err(SyncError::ReauthRequired(_))));
        assert_eq!(f.oauth.refresh_calls(), 0);
        assert_eq!(f.provider.calls_named("list"), 0);
    }

    #[tokio::test]
    async fn rejected_refresh_grant_requires_reauthorization() {
        let f = Fixture::new(
            MockCalendarProvider::accepting(&["access-1"]),
            MockOAuthProvider::accepting_refresh(&[]),
        );
        f.connect(CredentialSource::Calendar, "expired", Some("revoked"))
            .await;

        let result = f.sync.list_external_events("alice", day(5), day(5)).await;

        assert!(matches!(result, Err(SyncError::ReauthRequired(_))));
        assert_eq!(
            f.stored(CredentialSource::Calendar).await.unwrap().access_token,
            "expired"
        );
    }

    #[tokio::test]
    async fn user_without_credentials_is_not_connected() {
        let f = Fixture::new(MockCalendarProvider::new(), MockOAuthProvider::new());

        let result = f.sync.create_external_event("alice", &review()).await;

        assert!(matches!(result, Err(SyncError::NotConnected(_))));
        assert!(f.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn login_credentials_are_used_and_refreshed_in_place() {
        let f = Fixture::new(
            MockCalendarProvider::accepting(&["access-1"]),
            MockOAuthProvider::accepting_refresh(&["login-refresh"]),
        );
        f.connect(CredentialSource::Login, "login-expired", Some("login-refresh"))
            .await;

        f.sync
            .list_external_events("alice", day(5), day(9))
            .await
            .unwrap();

        assert!(f.stored(CredentialSource::Calendar).await.is_none());
        assert_eq!(
            f.stored(CredentialSource::Login).await.unwrap().access_token,
            "access-1"
        );
    }

    #[tokio::test]
    async fn calendar_credentials_win_over_login() {
        let f = Fixture::new(
            MockCalendarProvider::accepting(&["calendar-token"]),
            MockOAuthProvider::new(),
        );
        f.connect(CredentialSource::Login, "login-token", None).await;
        f.connect(CredentialSource::Calendar, "calendar-token", None)
            .await;

        f.sync
            .list_external_events("alice", day(5), day(5))
            .await
            .unwrap();

        assert_eq!(
            f.provider.calls(),
            vec!["probe:calendar-token".to_string(), "list:calendar-token".to_string()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_probe_times_out_without_refresh() {
        let f = Fixture::new(
            MockCalendarProvider::accepting(&["token"]),
            MockOAuthProvider::accepting_refresh(&["refresh-a"]),
        );
        f.connect(CredentialSource::Calendar, "token", Some("refresh-a"))
            .await;
        f.provider.set_delay(Duration::from_secs(30));
        let f = f.with_call_timeout(Duration::from_secs(2));

        let result = f.sync.list_external_events("alice", day(5), day(5)).await;

        assert!(matches!(
            result,
            Err(SyncError::Provider(ProviderError::Timeout(2)))
        ));
        assert_eq!(f.oauth.refresh_calls(), 0);
    }

    #[tokio::test]
    async fn non_auth_failures_are_not_retried() {
        let f = Fixture::new(
            MockCalendarProvider::accepting(&["token"]),
            MockOAuthProvider::accepting_refresh(&["refresh-a"]),
        );
        f.connect(CredentialSource::Calendar, "token", Some("refresh-a"))
            .await;
        f.provider
            .fail_next(ProviderError::Api("quota exceeded".to_string()));

        let result = f.sync.create_external_event("alice", &review()).await;

        assert!(matches!(result, Err(SyncError::Provider(ProviderError::Api(_)))));
        assert_eq!(f.oauth.refresh_calls(), 0);
        assert_eq!(f.provider.calls_named("create"), 1);
    }

    #[tokio::test]
    async fn sync_creates_then_updates_the_same_event() {
        let f = Fixture::new(MockCalendarProvider::accepting(&["token"]), MockOAuthProvider::new());
        f.connect(CredentialSource::Calendar, "token", None).await;
        let meeting = f.store_meeting().await;

        let synced = f.sync.sync_meeting("alice", &meeting.id).await.unwrap();
        assert!(synced.is_synced());
        assert_eq!(synced.external.event_id.as_deref(), Some("evt-1"));
        assert!(synced.external.calendar_url.is_some());
        assert_eq!(
            f.meetings.get_meeting(&meeting.id).await.unwrap(),
            Some(synced.clone())
        );

        let mut renamed = synced.clone();
        renamed.title = "Design review (moved)".to_string();
        f.meetings.update_meeting(renamed).await.unwrap();

        let again = f.sync.sync_meeting("alice", &meeting.id).await.unwrap();
        assert_eq!(again.external.event_id.as_deref(), Some("evt-1"));
        assert_eq!(f.provider.calls_named("create"), 1);
        assert_eq!(f.provider.calls_named("update"), 1);
        let events = f.provider.events.lock().unwrap();
        assert_eq!(events["evt-1"].title, "Design review (moved)");
    }

    #[tokio::test]
    async fn syncing_a_missing_meeting_is_not_found() {
        let f = Fixture::new(MockCalendarProvider::accepting(&["token"]), MockOAuthProvider::new());
        f.connect(CredentialSource::Calendar, "token", None).await;

        let result = f.sync.sync_meeting("alice", "nope").await;
        assert!(matches!(result, Err(SyncError::NotFound(_))));
    }

    #[tokio::test]
    async fn local_delete_survives_a_failed_external_delete() {
        let f = Fixture::new(MockCalendarProvider::accepting(&["token"]), MockOAuthProvider::new());
        f.connect(CredentialSource::Calendar, "token", None).await;
        let meeting = f.store_meeting().await;
        f.sync.sync_meeting("alice", &meeting.id).await.unwrap();
        f.provider
            .fail_next(ProviderError::Transport("connection reset".to_string()));

        let outcome = f.sync.delete_meeting("alice", &meeting.id).await.unwrap();

        assert!(outcome.deleted_locally);
        assert!(!outcome.external_deleted);
        assert!(f.meetings.get_meeting(&meeting.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_of_a_synced_meeting_removes_the_event() {
        let f = Fixture::new(MockCalendarProvider::accepting(&["token"]), MockOAuthProvider::new());
        f.connect(CredentialSource::Calendar, "token", None).await;
        let meeting = f.store_meeting().await;
        f.sync.sync_meeting("alice", &meeting.id).await.unwrap();

        let outcome = f.sync.delete_meeting("alice", &meeting.id).await.unwrap();

        assert!(outcome.external_deleted);
        assert!(f.provider.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsynced_meeting_is_deleted_without_provider_calls() {
        let f = Fixture::new(MockCalendarProvider::new(), MockOAuthProvider::new());
        let meeting = f.store_meeting().await;

        let outcome = f.sync.delete_meeting("alice", &meeting.id).await.unwrap();

        assert!(outcome.deleted_locally);
        assert!(!outcome.external_deleted);
        assert!(f.provider.calls().is_empty());
    }

    fn provider_event(id: &str, hour: u32) -> ExternalEvent {
        let start = Utc.with_ymd_and_hms(2025, 5, 6, hour, 0, 0).unwrap();
        ExternalEvent {
            id: id.to_string(),
            title: format!("Event {}", id),
            description: None,
            start,
            end: start + chrono::Duration::minutes(30),
            attendees: Vec::new(),
            join_link: None,
            canonical_link: Some(format!("https://calendar.example.com/{}", id)),
            all_day: false,
            status: "confirmed".to_string(),
        }
    }

    #[tokio::test]
    async fn import_stores_only_the_selected_events() {
        let f = Fixture::new(MockCalendarProvider::accepting(&["token"]), MockOAuthProvider::new());
        f.connect(CredentialSource::Calendar, "token", None).await;
        f.provider.insert_event(provider_event("a", 9));
        f.provider.insert_event(provider_event("b", 11));
        f.provider.insert_event(provider_event("c", 13));

        let imported = f
            .sync
            .import_events(
                "alice",
                day(5),
                day(7),
                &["a".to_string(), "c".to_string(), "gone".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(imported.len(), 2);
        assert!(imported.iter().all(|m| m.organizer_id == "alice" && m.is_synced()));
        let ids: Vec<_> = imported
            .iter()
            .filter_map(|m| m.external.event_id.clone())
            .collect();
        assert_eq!(ids, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(f.meetings.all().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn importing_twice_creates_duplicates() {
        let f = Fixture::new(MockCalendarProvider::accepting(&["token"]), MockOAuthProvider::new());
        f.connect(CredentialSource::Calendar, "token", None).await;
        f.provider.insert_event(provider_event("a", 9));
        let selection = vec!["a".to_string()];

        f.sync.import_events("alice", day(6), day(6), &selection).await.unwrap();
        f.sync.import_events("alice", day(6), day(6), &selection).await.unwrap();

        assert_eq!(f.meetings.all().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn empty_import_selection_is_invalid() {
        let f = Fixture::new(MockCalendarProvider::accepting(&["token"]), MockOAuthProvider::new());
        f.connect(CredentialSource::Calendar, "token", None).await;

        let result = f.sync.import_events("alice", day(5), day(6), &[]).await;
        assert!(matches!(result, Err(SyncError::Validation(_))));
        assert!(f.provider.calls().is_empty());
    }

    #[tokio::test]
    async fn reversed_range_is_invalid() {
        let f = Fixture::new(MockCalendarProvider::accepting(&["token"]), MockOAuthProvider::new());
        f.connect(CredentialSource::Calendar, "token", None).await;

        let result = f.sync.list_external_events("alice", day(9), day(5)).await;
        assert!(matches!(result, Err(SyncError::Validation(_))));
    }

    #[tokio::test]
    async fn authorization_round_trip_stores_calendar_credentials() {
        let f = Fixture::new(MockCalendarProvider::new(), MockOAuthProvider::new());

        let url = f.sync.get_auth_url("alice").unwrap();
        let state = url.split("state=").nth(1).unwrap().to_string();
        assert_eq!(f.sync.identify_user(&state).unwrap(), "alice");

        let user = f.sync.complete_authorization("code-7", &state).await.unwrap();
        assert_eq!(user, "alice");

        let stored = f.stored(CredentialSource::Calendar).await.unwrap();
        assert_eq!(stored.refresh_token.as_deref(), Some("refresh-code-7"));
        assert!(stored.calendar_linked);
    }

    #[tokio::test]
    async fn forged_state_is_rejected_before_exchange() {
        let f = Fixture::new(MockCalendarProvider::new(), MockOAuthProvider::new());
        let forged = StateSigner::new("other-secret", 600).sign("mallory").unwrap();

        let result = f.sync.complete_authorization("code-7", &forged).await;

        assert!(matches!(result, Err(SyncError::Validation(_))));
        assert!(f.stored(CredentialSource::Calendar).await.is_none());
    }

    #[tokio::test]
    async fn rejected_code_is_a_provider_error() {
        let f = Fixture::new(MockCalendarProvider::new(), MockOAuthProvider::new());
        let result = f.sync.exchange_code("bad-code").await;
        assert!(matches!(
            result,
            Err(SyncError::Provider(ProviderError::Unauthorized(_)))
        ));
    }

    #[tokio::test]
    async fn status_and_disconnect_follow_the_calendar_credential() {
        let f = Fixture::new(MockCalendarProvider::new(), MockOAuthProvider::new());
        assert!(!f.sync.connection_status("alice").await.unwrap().connected);

        f.connect(CredentialSource::Calendar, "token", Some("refresh")).await;
        let status = f.sync.connection_status("alice").await.unwrap();
        assert!(status.connected);
        assert_eq!(status.source.as_deref(), Some("calendar"));
        assert!(status.has_refresh_token);

        assert!(f.sync.disconnect("alice").await.unwrap());
        assert!(!f.sync.disconnect("alice").await.unwrap());
        assert!(!f.sync.connection_status("alice").await.unwrap().connected);
    }
}
