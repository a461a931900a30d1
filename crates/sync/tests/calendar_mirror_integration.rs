use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{patch, post};
use axum::{Json, Router};
use lexflow_common::types::{Case, CasePatch, Task, TaskPatch, TaskPriority};
use lexflow_sync::calendar::{CalendarApi, GoogleCalendarClient};
use lexflow_sync::config::GlobalConfig;
use lexflow_sync::security::{MemorySecretStore, SecretStore};
use lexflow_sync::PracticeContext;
use serde_json::{json, Value};
use tempfile::TempDir;

const GOOD_TOKEN: &str = "ya29.good";

/// In-process stand-in for the calendar events API.
#[derive(Default)]
struct FakeCalendar {
    events: HashMap<String, Value>,
    created: u32,
    log: Vec<String>,
}

type Shared = Arc<Mutex<FakeCalendar>>;

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {GOOD_TOKEN}"))
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": { "code": 404, "message": "Not Found" } }))).into_response()
}

async fn create(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().expect("state lock");
    state.log.push("create".into());
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.created += 1;
    let id = format!("evt-{}", state.created);
    state.events.insert(id.clone(), body);
    Json(json!({ "id": id, "status": "confirmed" })).into_response()
}

async fn update(
    State(state): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("state lock");
    state.log.push(format!("update {id}"));
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.events.get_mut(&id) {
        Some(event) => {
            if let (Some(event), Some(fields)) = (event.as_object_mut(), body.as_object()) {
                event.extend(fields.clone());
            }
            Json(json!({ "id": id })).into_response()
        }
        None => not_found(),
    }
}

async fn remove(State(state): State<Shared>, Path(id): Path<String>, headers: HeaderMap) -> Response {
    let mut state = state.lock().expect("state lock");
    state.log.push(format!("delete {id}"));
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.events.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => StatusCode::GONE.into_response(),
    }
}

async fn serve(state: Shared) -> String {
    let app = Router::new()
        .route("/calendar/v3/calendars/primary/events", post(create))
        .route("/calendar/v3/calendars/primary/events/{id}", patch(update).delete(remove))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake calendar should run");
    });
    format!("http://{addr}/calendar/v3")
}

struct Harness {
    calendar: Shared,
    context: PracticeContext,
    _dir: TempDir,
}

async fn harness(token: Option<&str>) -> Harness {
    let calendar: Shared = Arc::new(Mutex::new(FakeCalendar::default()));
    let base = serve(calendar.clone()).await;
    let dir = TempDir::new().expect("tempdir should be created");

    let mut config = GlobalConfig { data_dir: Some(dir.path().to_path_buf()), ..GlobalConfig::default() };
    config.calendar.client_id = Some("abc.apps.googleusercontent.com".into());
    config.calendar.api_base = Some(base.clone());

    let api: Arc<dyn CalendarApi> = Arc::new(GoogleCalendarClient::new(&base).expect("client builds"));
    let secrets: Arc<dyn SecretStore> = Arc::new(MemorySecretStore::default());
    let context = PracticeContext::open_with(config, secrets, Some(api)).await.expect("context should open");
    if let Some(token) = token {
        context.connect_calendar(token, 3600).expect("connect should succeed");
    }
    Harness { calendar, context, _dir: dir }
}

fn hearing_case(next_hearing: &str) -> Case {
    Case {
        case_number: "CIV/2024/7".into(),
        title: "Rao vs. Municipal Board".into(),
        client_id: "1".into(),
        client_name: "Rajesh Kumar".into(),
        court: "District Court".into(),
        next_hearing: next_hearing.into(),
        first_party: Some("Rao".into()),
        opposite_party: Some("Municipal Board".into()),
        ..Case::default()
    }
}

#[tokio::test]
async fn scheduled_case_becomes_one_all_day_event_with_reminders() {
    let h = harness(Some(GOOD_TOKEN)).await;
    let orchestrator = h.context.orchestrator();

    let added = orchestrator.add(hearing_case("2024-03-15")).await.expect("add should succeed");
    orchestrator.settle_mirrors().await;

    let stored = h.context.store().case(&added.id).expect("case stored");
    assert_eq!(stored.google_calendar_event_id.as_deref(), Some("evt-1"));

    let calendar = h.calendar.lock().expect("state lock");
    assert_eq!(calendar.events.len(), 1);
    let event = &calendar.events["evt-1"];
    assert_eq!(event["start"], json!({ "date": "2024-03-15" }));
    assert_eq!(event["end"], json!({ "date": "2024-03-16" }));
    assert_eq!(event["colorId"], json!("9"));
    assert_eq!(event["summary"], json!("⚖️ Hearing: Rao vs. Municipal Board"));
    assert!(event["description"].as_str().is_some_and(|d| d.ends_with("Rao vs Municipal Board")));
    assert_eq!(
        event["reminders"],
        json!({
            "useDefault": false,
            "overrides": [{ "method": "email", "minutes": 1440 }, { "method": "popup", "minutes": 60 }],
        })
    );
}

#[tokio::test]
async fn event_id_is_persisted_to_the_local_store() {
    let h = harness(Some(GOOD_TOKEN)).await;
    let added = h.context.orchestrator().add(hearing_case("2024-03-15")).await.expect("add");
    h.context.orchestrator().settle_mirrors().await;

    let config = h.context.config().clone();
    let reopened = PracticeContext::open_with(config, Arc::new(MemorySecretStore::default()), None)
        .await
        .expect("context should reopen");
    let case = reopened.store().case(&added.id).expect("case persisted");
    assert_eq!(case.google_calendar_event_id.as_deref(), Some("evt-1"));
}

#[tokio::test]
async fn unscheduled_case_makes_no_calendar_calls() {
    let h = harness(Some(GOOD_TOKEN)).await;
    h.context.orchestrator().add(hearing_case("-")).await.expect("add should succeed");
    h.context.orchestrator().settle_mirrors().await;
    assert!(h.calendar.lock().expect("state lock").log.is_empty());
}

#[tokio::test]
async fn repeated_reschedule_updates_instead_of_duplicating() {
    let h = harness(Some(GOOD_TOKEN)).await;
    let orchestrator = h.context.orchestrator();
    let added = orchestrator.add(hearing_case("2024-03-15")).await.expect("add");
    orchestrator.settle_mirrors().await;

    for _ in 0..2 {
        let patch = CasePatch { next_hearing: Some("2024-04-01".into()), ..CasePatch::default() };
        let updated = orchestrator.update::<Case>(&added.id, patch).await.expect("update");
        assert_eq!(updated.google_calendar_event_id.as_deref(), Some("evt-1"));
    }

    let calendar = h.calendar.lock().expect("state lock");
    assert_eq!(calendar.events.len(), 1);
    assert_eq!(calendar.events["evt-1"]["start"], json!({ "date": "2024-04-01" }));
    assert_eq!(calendar.log, vec!["create", "update evt-1", "update evt-1"]);
}

#[tokio::test]
async fn event_removed_out_of_band_is_recreated() {
    let h = harness(Some(GOOD_TOKEN)).await;
    let orchestrator = h.context.orchestrator();
    let added = orchestrator.add(hearing_case("2024-03-15")).await.expect("add");
    orchestrator.settle_mirrors().await;
    h.calendar.lock().expect("state lock").events.clear();

    let patch = CasePatch { next_hearing: Some("2024-04-20".into()), ..CasePatch::default() };
    let updated = orchestrator.update::<Case>(&added.id, patch).await.expect("update");

    assert_eq!(updated.google_calendar_event_id.as_deref(), Some("evt-2"));
    assert_eq!(h.context.store().case(&added.id), Some(updated));
}

#[tokio::test]
async fn rejected_credential_is_cleared_and_writes_still_succeed() {
    let h = harness(Some("ya29.expired")).await;
    assert!(h.context.calendar_connected());

    let task = Task {
        title: "File reply".into(),
        due_date: "2024-04-30".into(),
        priority: TaskPriority::High,
        ..Task::default()
    };
    let added = h.context.orchestrator().add(task).await.expect("add should succeed");
    h.context.orchestrator().settle_mirrors().await;

    assert!(!h.context.calendar_connected());
    assert_eq!(h.context.store().task(&added.id).expect("task stored").google_calendar_event_id, None);

    let patch = TaskPatch { deadline: Some("2024-04-25".into()), ..TaskPatch::default() };
    h.context.orchestrator().update::<Task>(&added.id, patch).await.expect("update should succeed");
    assert_eq!(h.calendar.lock().expect("state lock").log, vec!["create"]);
}

#[tokio::test]
async fn deleting_records_removes_their_events() {
    let h = harness(Some(GOOD_TOKEN)).await;
    let orchestrator = h.context.orchestrator();
    let first = orchestrator.add(hearing_case("2024-03-15")).await.expect("add");
    let second = orchestrator.add(hearing_case("2024-03-16")).await.expect("add");
    orchestrator.settle_mirrors().await;

    let gone = h.context.store().case(&second.id).and_then(|case| case.google_calendar_event_id);
    h.calendar.lock().expect("state lock").events.remove(gone.as_deref().expect("second event id"));

    orchestrator.delete::<Case>(&first.id).await.expect("delete");
    orchestrator.delete::<Case>(&second.id).await.expect("delete of record with vanished event");
    orchestrator.settle_mirrors().await;

    let calendar = h.calendar.lock().expect("state lock");
    assert!(calendar.events.is_empty());
    assert_eq!(calendar.log.iter().filter(|entry| entry.starts_with("delete")).count(), 2);
    assert!(h.context.store().cases().iter().all(|case| case.id != first.id && case.id != second.id));
}

#[tokio::test]
async fn disconnected_calendar_skips_mirroring() {
    let h = harness(None).await;
    assert!(h.context.calendar_configured());
    assert!(!h.context.calendar_connected());

    h.context.orchestrator().add(hearing_case("2024-03-15")).await.expect("add should succeed");
    h.context.orchestrator().settle_mirrors().await;
    assert!(h.calendar.lock().expect("state lock").log.is_empty());

    h.context
        .connect_calendar_from_callback(&format!("http://localhost:5173/#access_token={GOOD_TOKEN}&expires_in=3599"))
        .expect("callback connects");
    assert!(h.context.calendar_connected());
    h.context.disconnect_calendar().expect("disconnect");
    assert!(!h.context.calendar_connected());
}
