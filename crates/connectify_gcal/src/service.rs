// --- File: crates/connectify_gcal/src/service.rs ---
//! Google Calendar implementation of [`CalendarProvider`].

use chrono::{DateTime, Utc};
use connectify_common::services::{
    BoxFuture, CalendarProvider, CreatedExternalEvent, ExternalEvent, ExternalEventDraft,
    ProviderError,
};
use chrono_tz::Tz;
use tracing::{debug, info};

use crate::auth::{hub_for_token, Connector};
use crate::logic::{build_event, classify_error, join_link, map_event};

/// Upper bound on pages fetched by one listing.
const MAX_LIST_PAGES: usize = 20;

/// Talks to one calendar (usually `primary`) of whichever user's token is
/// passed in.
pub struct GoogleCalendarProvider {
    connector: Connector,
    calendar_id: String,
    time_zone: Tz,
}

impl GoogleCalendarProvider {
    pub fn new(connector: Connector, calendar_id: impl Into<String>, time_zone: Tz) -> Self {
        Self {
            connector,
            calendar_id: calendar_id.into(),
            time_zone,
        }
    }
}

impl CalendarProvider for GoogleCalendarProvider {
    fn probe(&self, access_token: &str) -> BoxFuture<'_, (), ProviderError> {
        let hub = hub_for_token(&self.connector, access_token);
        Box::pin(async move {
            hub.calendar_list()
                .list()
                .max_results(1)
                .doit()
                .await
                .map_err(classify_error)?;
            Ok(())
        })
    }

    fn create_event(
        &self,
        access_token: &str,
        event: ExternalEventDraft,
    ) -> BoxFuture<'_, CreatedExternalEvent, ProviderError> {
        let hub = hub_for_token(&self.connector, access_token);
        Box::pin(async move {
            let (_response, created) = hub
                .events()
                .insert(build_event(&event), &self.calendar_id)
                .conference_data_version(1)
                .doit()
                .await
                .map_err(classify_error)?;

            let external_id = created
                .id
                .clone()
                .ok_or_else(|| ProviderError::Api("created event has no id".to_string()))?;
            info!("Created calendar event {}", external_id);

            Ok(CreatedExternalEvent {
                join_link: join_link(&created),
                canonical_link: created.html_link.clone(),
                external_id,
            })
        })
    }

    fn update_event(
        &self,
        access_token: &str,
        external_id: &str,
        event: ExternalEventDraft,
    ) -> BoxFuture<'_, (), ProviderError> {
        let hub = hub_for_token(&self.connector, access_token);
        let external_id = external_id.to_string();
        Box::pin(async move {
            let mut patch = build_event(&event);
            // Keep the existing conference on updates.
            patch.conference_data = None;
            hub.events()
                .patch(patch, &self.calendar_id, &external_id)
                .doit()
                .await
                .map_err(classify_error)?;
            info!("Patched calendar event {}", external_id);
            Ok(())
        })
    }

    fn delete_event(
        &self,
        access_token: &str,
        external_id: &str,
    ) -> BoxFuture<'_, (), ProviderError> {
        let hub = hub_for_token(&self.connector, access_token);
        let external_id = external_id.to_string();
        Box::pin(async move {
            hub.events()
                .delete(&self.calendar_id, &external_id)
                .doit()
                .await
                .map_err(classify_error)?;
            info!("Deleted calendar event {}", external_id);
            Ok(())
        })
    }

    fn list_events(
        &self,
        access_token: &str,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<ExternalEvent>, ProviderError> {
        let hub = hub_for_token(&self.connector, access_token);
        Box::pin(async move {
            let mut events = Vec::new();
            let mut page_token: Option<String> = None;

            for _ in 0..MAX_LIST_PAGES {
                let mut request = hub
                    .events()
                    .list(&self.calendar_id)
                    .time_min(range_start)
                    .time_max(range_end)
                    .single_events(true)
                    .order_by("startTime");
                if let Some(token) = page_token.as_deref() {
                    request = request.page_token(token);
                }

                let (_response, page) = request.doit().await.map_err(classify_error)?;
                events.extend(
                    page.items
                        .unwrap_or_default()
                        .into_iter()
                        .filter_map(|event| map_event(event, self.time_zone)),
                );

                page_token = page.next_page_token;
                if page_token.is_none() {
                    break;
                }
            }

            debug!(
                "Listed {} calendar events between {} and {}",
                events.len(),
                range_start,
                range_end
            );
            Ok(events)
        })
    }
}

/// In-process provider and OAuth endpoint for tests and local runs.
pub mod mock {
    use super::*;
    use connectify_common::services::{OAuthProvider, OAuthTokens};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records every call and answers from its own event map.
    ///
    /// Only tokens in `valid_tokens` are accepted; `queued_failures` are
    /// returned, in order, by the next non-probe calls.
    #[derive(Default)]
    pub struct MockCalendarProvider {
        pub valid_tokens: Mutex<Vec<String>>,
        pub events: Mutex<HashMap<String, ExternalEvent>>,
        pub calls: Mutex<Vec<String>>,
        pub queued_failures: Mutex<VecDeque<ProviderError>>,
        pub delay: Mutex<Option<Duration>>,
        next_id: Mutex<u32>,
    }

    impl MockCalendarProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn accepting(tokens: &[&str]) -> Self {
            let provider = Self::new();
            provider.set_valid_tokens(tokens);
            provider
        }

        pub fn set_valid_tokens(&self, tokens: &[&str]) {
            if let Ok(mut valid) = self.valid_tokens.lock() {
                *valid = tokens.iter().map(|t| t.to_string()).collect();
            }
        }

        pub fn fail_next(&self, error: ProviderError) {
            if let Ok(mut failures) = self.queued_failures.lock() {
                failures.push_back(error);
            }
        }

        pub fn set_delay(&self, delay: Duration) {
            if let Ok(mut current) = self.delay.lock() {
                *current = Some(delay);
            }
        }

        pub fn insert_event(&self, event: ExternalEvent) {
            if let Ok(mut events) = self.events.lock() {
                events.insert(event.id.clone(), event);
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map(|c| c.clone()).unwrap_or_default()
        }

        pub fn calls_named(&self, name: &str) -> usize {
            self.calls()
                .iter()
                .filter(|c| c.split(':').next() == Some(name))
                .count()
        }

        fn record(&self, name: &str, token: &str) {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(format!("{}:{}", name, token));
            }
        }

        async fn gate(&self, name: &str, token: &str) -> Result<(), ProviderError> {
            self.record(name, token);
            let delay = self.delay.lock().ok().and_then(|d| *d);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let valid = self
                .valid_tokens
                .lock()
                .map(|v| v.iter().any(|t| t == token))
                .unwrap_or(false);
            if !valid {
                return Err(ProviderError::Unauthorized(format!("token {} rejected", token)));
            }
            if name != "probe" {
                let queued = self.queued_failures.lock().ok().and_then(|mut q| q.pop_front());
                if let Some(error) = queued {
                    return Err(error);
                }
            }
            Ok(())
        }

        fn lock_events(
            &self,
        ) -> Result<std::sync::MutexGuard<'_, HashMap<String, ExternalEvent>>, ProviderError>
        {
            self.events
                .lock()
                .map_err(|_| ProviderError::Api("mock poisoned".to_string()))
        }
    }

    impl CalendarProvider for MockCalendarProvider {
        fn probe(&self, access_token: &str) -> BoxFuture<'_, (), ProviderError> {
            let token = access_token.to_string();
            Box::pin(async move { self.gate("probe", &token).await })
        }

        fn create_event(
            &self,
            access_token: &str,
            event: ExternalEventDraft,
        ) -> BoxFuture<'_, CreatedExternalEvent, ProviderError> {
            let token = access_token.to_string();
            Box::pin(async move {
                self.gate("create", &token).await?;
                let id = {
                    let mut next = self
                        .next_id
                        .lock()
                        .map_err(|_| ProviderError::Api("mock poisoned".to_string()))?;
                    *next += 1;
                    format!("evt-{}", *next)
                };
                let join = event
                    .request_conference
                    .then(|| format!("https://meet.example.com/{}", id));
                let canonical = format!("https://calendar.example.com/event?eid={}", id);
                self.lock_events()?.insert(
                    id.clone(),
                    ExternalEvent {
                        id: id.clone(),
                        title: event.summary,
                        description: event.description,
                        start: event.start,
                        end: event.end,
                        attendees: event.attendees,
                        join_link: join.clone(),
                        canonical_link: Some(canonical.clone()),
                        all_day: false,
                        status: "confirmed".to_string(),
                    },
                );
                Ok(CreatedExternalEvent {
                    external_id: id,
                    join_link: join,
                    canonical_link: Some(canonical),
                })
            })
        }

        fn update_event(
            &self,
            access_token: &str,
            external_id: &str,
            event: ExternalEventDraft,
        ) -> BoxFuture<'_, (), ProviderError> {
            let token = access_token.to_string();
            let external_id = external_id.to_string();
            Box::pin(async move {
                self.gate("update", &token).await?;
                let mut events = self.lock_events()?;
                let existing = events
                    .get_mut(&external_id)
                    .ok_or_else(|| ProviderError::NotFound(external_id.clone()))?;
                existing.title = event.summary;
                existing.description = event.description;
                existing.start = event.start;
                existing.end = event.end;
                existing.attendees = event.attendees;
                Ok(())
            })
        }

        fn delete_event(
            &self,
            access_token: &str,
            external_id: &str,
        ) -> BoxFuture<'_, (), ProviderError> {
            let token = access_token.to_string();
            let external_id = external_id.to_string();
            Box::pin(async move {
                self.gate("delete", &token).await?;
                self.lock_events()?
                    .remove(&external_id)
                    .map(|_| ())
                    .ok_or(ProviderError::NotFound(external_id))
            })
        }

        fn list_events(
            &self,
            access_token: &str,
            range_start: DateTime<Utc>,
            range_end: DateTime<Utc>,
        ) -> BoxFuture<'_, Vec<ExternalEvent>, ProviderError> {
            let token = access_token.to_string();
            Box::pin(async move {
                self.gate("list", &token).await?;
                let mut listed: Vec<ExternalEvent> = self
                    .lock_events()?
                    .values()
                    .filter(|e| e.start < range_end && e.end > range_start)
                    .cloned()
                    .collect();
                listed.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
                Ok(listed)
            })
        }
    }

    /// Issues `access-N` tokens. Refresh grants are accepted only for
    /// tokens in `valid_refresh_tokens`.
    #[derive(Default)]
    pub struct MockOAuthProvider {
        pub valid_refresh_tokens: Mutex<Vec<String>>,
        pub issued: Mutex<u32>,
        pub refresh_calls: Mutex<u32>,
    }

    impl MockOAuthProvider {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn accepting_refresh(tokens: &[&str]) -> Self {
            let oauth = Self::new();
            if let Ok(mut valid) = oauth.valid_refresh_tokens.lock() {
                *valid = tokens.iter().map(|t| t.to_string()).collect();
            }
            oauth
        }

        pub fn refresh_calls(&self) -> u32 {
            self.refresh_calls.lock().map(|c| *c).unwrap_or(0)
        }

        fn issue(&self) -> String {
            match self.issued.lock() {
                Ok(mut issued) => {
                    *issued += 1;
                    format!("access-{}", *issued)
                }
                Err(_) => "access-poisoned".to_string(),
            }
        }
    }

    impl OAuthProvider for MockOAuthProvider {
        fn authorization_url(&self, state: &str) -> String {
            format!("https://accounts.example.com/auth?state={}", state)
        }

        fn exchange_code(&self, code: &str) -> BoxFuture<'_, OAuthTokens, ProviderError> {
            let code = code.to_string();
            Box::pin(async move {
                if code.is_empty() || code == "bad-code" {
                    return Err(ProviderError::Unauthorized("invalid_grant".to_string()));
                }
                Ok(OAuthTokens {
                    access_token: self.issue(),
                    refresh_token: Some(format!("refresh-{}", code)),
                    expires_in: Some(3600),
                    scope: None,
                })
            })
        }

        fn refresh_access_token(
            &self,
            refresh_token: &str,
        ) -> BoxFuture<'_, OAuthTokens, ProviderError> {
            let refresh_token = refresh_token.to_string();
            Box::pin(async move {
                if let Ok(mut calls) = self.refresh_calls.lock() {
                    *calls += 1;
                }
                let accepted = self
                    .valid_refresh_tokens
                    .lock()
                    .map(|v| v.contains(&refresh_token))
                    .unwrap_or(false);
                if !accepted {
                    return Err(ProviderError::Unauthorized("invalid_grant".to_string()));
                }
                Ok(OAuthTokens {
                    access_token: self.issue(),
                    refresh_token: None,
                    expires_in: Some(3600),
                    scope: None,
                })
            })
        }
    }
}
