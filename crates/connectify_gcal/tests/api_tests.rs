use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use connectify_common::memory::{InMemoryCredentialStore, InMemoryMeetingStore};
use connectify_common::models::{CredentialRecord, CredentialSource, Meeting};
use connectify_common::services::{CredentialStore, ExternalEvent, MeetingStore, ProviderError};
use connectify_gcal::routes::routes;
use connectify_gcal::service::mock::{MockCalendarProvider, MockOAuthProvider};
use connectify_gcal::state::StateSigner;
use connectify_gcal::{CalendarSynchronizer, GcalState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    meetings: Arc<InMemoryMeetingStore>,
    credentials: Arc<InMemoryCredentialStore>,
    provider: Arc<MockCalendarProvider>,
}

async fn app() -> TestApp {
    let meetings = Arc::new(InMemoryMeetingStore::new());
    let credentials = Arc::new(InMemoryCredentialStore::new());
    let provider = Arc::new(MockCalendarProvider::accepting(&["token"]));
    let oauth = Arc::new(MockOAuthProvider::new());

    credentials
        .save_credentials(
            "alice",
            CredentialSource::Calendar,
            CredentialRecord::new("token", None, true).unwrap(),
        )
        .await
        .unwrap();

    let synchronizer = CalendarSynchronizer::new(
        meetings.clone(),
        credentials.clone(),
        provider.clone(),
        oauth,
        StateSigner::new("api-test-secret", 600),
    );
    let router = routes(Arc::new(GcalState {
        synchronizer: Arc::new(synchronizer),
    }));

    TestApp {
        router,
        meetings,
        credentials,
        provider,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn stored_meeting(app: &TestApp) -> Meeting {
    let meeting = Meeting::new(
        "Kickoff",
        "alice",
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap(),
        NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        30,
    );
    app.meetings.insert_meeting(meeting).await.unwrap()
}

#[tokio::test]
async fn auth_url_requires_a_user() {
    let app = app().await;

    let (status, body) = send(&app, get("/gcal/auth-url?user_id=bob")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["url"].as_str().unwrap().contains("state="));

    let (status, body) = send(&app, get("/gcal/auth-url?user_id=%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], 400);
}

#[tokio::test]
async fn callback_connects_the_user_named_in_the_state() {
    let app = app().await;
    let (_, body) = send(&app, get("/gcal/auth-url?user_id=bob")).await;
    let url = body["url"].as_str().unwrap().to_string();
    let state = url.split("state=").nth(1).unwrap();

    let (status, body) = send(
        &app,
        get(&format!("/gcal/callback?code=abc&state={}", state)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"user_id": "bob", "connected": true}));

    let stored = app
        .credentials
        .get_credentials("bob", CredentialSource::Calendar)
        .await
        .unwrap();
    assert!(stored.is_some());
}

#[tokio::test]
async fn callback_with_consent_error_is_unauthorized() {
    let app = app().await;
    let (status, _) = send(&app, get("/gcal/callback?error=access_denied")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/gcal/callback?code=abc&state=garbage")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_and_disconnect() {
    let app = app().await;

    let (status, body) = send(&app, get("/gcal/status?user_id=alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["connected"], true);
    assert_eq!(body["source"], "calendar");

    let (status, body) = send(&app, delete("/gcal/connection?user_id=alice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["disconnected"], true);

    let (_, body) = send(&app, get("/gcal/status?user_id=alice")).await;
    assert_eq!(body["connected"], false);
}

#[tokio::test]
async fn events_and_import() {
    let app = app().await;
    let start = Utc.with_ymd_and_hms(2025, 5, 6, 10, 0, 0).unwrap();
    app.provider.insert_event(ExternalEvent {
        id: "ext-1".to_string(),
        title: "Vendor demo".to_string(),
        description: None,
        start,
        end: start + chrono::Duration::hours(1),
        attendees: Vec::new(),
        join_link: None,
        canonical_link: None,
        all_day: false,
        status: "confirmed".to_string(),
    });

    let (status, body) = send(
        &app,
        get("/gcal/events?user_id=alice&start_date=2025-05-05&end_date=2025-05-09"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"][0]["id"], "ext-1");

    let (status, body) = send(
        &app,
        with_json(
            "POST",
            "/gcal/import",
            json!({
                "user_id": "alice",
                "start_date": "2025-05-05",
                "end_date": "2025-05-09",
                "event_ids": ["ext-1"]
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["imported"], 1);
    assert_eq!(body["meetings"][0]["start_time"], "10:00");
    assert_eq!(body["meetings"][0]["external"]["synced"], true);
}

#[tokio::test]
async fn bad_dates_are_rejected() {
    let app = app().await;
    let (status, _) = send(
        &app,
        get("/gcal/events?user_id=alice&start_date=05/05/2025&end_date=2025-05-09"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unconnected_user_gets_401() {
    let app = app().await;
    let (status, body) = send(
        &app,
        get("/gcal/events?user_id=zoe&start_date=2025-05-05&end_date=2025-05-05"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("No calendar connected"));
}

#[tokio::test]
async fn sync_then_delete_a_meeting() {
    let app = app().await;
    let meeting = stored_meeting(&app).await;

    let (status, body) = send(
        &app,
        with_json(
            "POST",
            &format!("/gcal/meetings/{}/sync", meeting.id),
            json!({"user_id": "alice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["external"]["event_id"], "evt-1");

    app.provider
        .fail_next(ProviderError::Api("backend error".to_string()));
    let (status, body) = send(
        &app,
        delete(&format!("/gcal/meetings/{}?user_id=alice", meeting.id)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted_locally"], true);
    assert_eq!(body["external_deleted"], false);
    assert!(app.meetings.all().unwrap().is_empty());
}

#[tokio::test]
async fn provider_failure_maps_to_bad_gateway() {
    let app = app().await;
    let meeting = stored_meeting(&app).await;
    app.provider
        .fail_next(ProviderError::Api("rate limited".to_string()));

    let (status, _) = send(
        &app,
        with_json(
            "POST",
            &format!("/gcal/meetings/{}/sync", meeting.id),
            json!({"user_id": "alice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn syncing_unknown_meeting_is_404() {
    let app = app().await;
    let (status, _) = send(
        &app,
        with_json(
            "POST",
            "/gcal/meetings/missing/sync",
            json!({"user_id": "alice"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
