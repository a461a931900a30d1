use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use lexflow_common::types::{Client, LegalDocument, Task, TaskPatch, TaskStatus};
use lexflow_sync::backend::{BackendError, LoadSource};
use lexflow_sync::config::{GlobalConfig, RemoteConfig};
use lexflow_sync::security::MemorySecretStore;
use lexflow_sync::selector::BackendKind;
use lexflow_sync::{PracticeContext, SyncError};
use serde_json::{json, Map, Value};
use tempfile::TempDir;

const KEY: &str = "anon-key";

/// In-process stand-in for the remote table service.
#[derive(Default)]
struct FakeTables {
    tables: HashMap<String, Vec<Value>>,
    next_id: u64,
    fail_reads: bool,
    fail_writes: bool,
    requests: Vec<(String, String, Value)>,
}

type Shared = Arc<Mutex<FakeTables>>;

fn authorized(headers: &HeaderMap) -> bool {
    let apikey = headers.get("apikey").and_then(|v| v.to_str().ok());
    let bearer = headers.get("authorization").and_then(|v| v.to_str().ok());
    apikey == Some(KEY) && bearer.is_some_and(|value| value == format!("Bearer {KEY}"))
}

fn target_id(query: &HashMap<String, String>) -> Option<String> {
    query.get("id").and_then(|filter| filter.strip_prefix("eq.")).map(str::to_string)
}

fn row_id(row: &Value) -> String {
    match &row["id"] {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    }
}

async fn list(State(state): State<Shared>, Path(table): Path<String>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let state = state.lock().expect("state lock");
    if state.fail_reads {
        return (StatusCode::SERVICE_UNAVAILABLE, "read replica down").into_response();
    }
    Json(state.tables.get(&table).cloned().unwrap_or_default()).into_response()
}

async fn insert(
    State(state): State<Shared>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut state = state.lock().expect("state lock");
    state.requests.push(("POST".into(), table.clone(), body.clone()));
    if state.fail_writes {
        return (StatusCode::INTERNAL_SERVER_ERROR, "write rejected").into_response();
    }
    state.next_id += 1;
    let mut row: Map<String, Value> = body.as_object().cloned().unwrap_or_default();
    row.insert("id".into(), json!(1000 + state.next_id));
    row.insert("created_at".into(), json!(format!("2024-01-01T00:00:{:02}Z", state.next_id)));
    let row = Value::Object(row);
    state.tables.entry(table).or_default().push(row.clone());
    (StatusCode::CREATED, Json(json!([row]))).into_response()
}

async fn patch_rows(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut state = state.lock().expect("state lock");
    state.requests.push(("PATCH".into(), table.clone(), body.clone()));
    if state.fail_writes {
        return (StatusCode::INTERNAL_SERVER_ERROR, "write rejected").into_response();
    }
    let id = target_id(&query);
    for row in state.tables.entry(table).or_default().iter_mut() {
        if Some(row_id(row)) == id {
            if let (Some(row), Some(fields)) = (row.as_object_mut(), body.as_object()) {
                row.extend(fields.clone());
            }
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_rows(
    State(state): State<Shared>,
    Path(table): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let mut state = state.lock().expect("state lock");
    state.requests.push(("DELETE".into(), table.clone(), Value::Null));
    if state.fail_writes {
        return (StatusCode::INTERNAL_SERVER_ERROR, "write rejected").into_response();
    }
    let id = target_id(&query);
    state.tables.entry(table).or_default().retain(|row| Some(row_id(row)) != id);
    StatusCode::NO_CONTENT.into_response()
}

async fn serve(state: Shared) -> String {
    let app = Router::new()
        .route("/rest/v1/{table}", get(list).post(insert).patch(patch_rows).delete(delete_rows))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("listener should bind");
    let addr = listener.local_addr().expect("listener should have an address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake table service should run");
    });
    format!("http://{addr}")
}

fn seeded_tables() -> FakeTables {
    let mut tables = HashMap::new();
    tables.insert(
        "clients".to_string(),
        vec![json!({ "id": 7, "name": "Meera Iyer", "email": "meera@example.com", "type": "Corporate", "status": "Active" })],
    );
    tables.insert(
        "cases".to_string(),
        vec![json!({
            "id": "c-1",
            "case_number": "CIV/2024/9",
            "title": "Iyer vs. State",
            "client_id": "7",
            "client_name": "Meera Iyer",
            "status": "On Appeal",
            "next_hearing": "2024-05-02",
            "police_station": null,
        })],
    );
    tables.insert(
        "tasks".to_string(),
        vec![json!({ "id": "t-1", "title": "Draft appeal", "due_date": "2024-04-30", "priority": "High", "status": "To Do" })],
    );
    FakeTables { tables, ..FakeTables::default() }
}

async fn open(url: &str, dir: &TempDir) -> PracticeContext {
    let config = GlobalConfig {
        data_dir: Some(dir.path().to_path_buf()),
        remote: RemoteConfig { url: Some(url.to_string()), key: Some(KEY.to_string()) },
        ..GlobalConfig::default()
    };
    PracticeContext::open_with(config, Arc::new(MemorySecretStore::default()), None)
        .await
        .expect("context should open")
}

#[tokio::test]
async fn startup_reads_every_collection_from_the_remote_service() {
    let state: Shared = Arc::new(Mutex::new(seeded_tables()));
    let url = serve(state.clone()).await;
    let dir = TempDir::new().expect("tempdir should be created");
    let context = open(&url, &dir).await;

    assert_eq!(context.backend_kind(), BackendKind::Remote);
    let report = context.load_report();
    assert_eq!(report.clients, LoadSource::Remote);
    assert_eq!(report.documents, LoadSource::Remote);
    assert!(report.remote_error.is_none());

    let store = context.store();
    assert_eq!(store.client("7").expect("numeric id is stringified").name, "Meera Iyer");
    let case = store.case("c-1").expect("case loaded");
    assert_eq!(case.case_number, "CIV/2024/9");
    assert_eq!(case.next_hearing, "2024-05-02");
    assert!(case.hearing_history.is_empty());
    assert_eq!(case.police_station, None);
    assert!(store.documents().is_empty());
}

#[tokio::test]
async fn add_uses_the_row_returned_by_the_service() {
    let state: Shared = Arc::new(Mutex::new(seeded_tables()));
    let url = serve(state.clone()).await;
    let dir = TempDir::new().expect("tempdir should be created");
    let context = open(&url, &dir).await;

    let task = Task {
        title: "Collect certified copy".into(),
        case_id: Some("c-1".into()),
        due_date: "2024-05-10".into(),
        working_day: Some("Friday".into()),
        ..Task::default()
    };
    let added = context.orchestrator().add(task).await.expect("insert should succeed");
    assert_eq!(added.id, "1001");
    assert_eq!(context.store().task("1001"), Some(added));

    let state = state.lock().expect("state lock");
    let (method, table, body) = state.requests.last().expect("insert recorded");
    assert_eq!((method.as_str(), table.as_str()), ("POST", "tasks"));
    assert!(body.get("id").is_none());
    assert_eq!(body["case_id"], json!("c-1"));
    assert_eq!(body["working_day"], json!("Friday"));
    assert_eq!(body["due_date"], json!("2024-05-10"));
}

#[tokio::test]
async fn update_sends_only_the_named_columns() {
    let state: Shared = Arc::new(Mutex::new(seeded_tables()));
    let url = serve(state.clone()).await;
    let dir = TempDir::new().expect("tempdir should be created");
    let context = open(&url, &dir).await;

    let patch = TaskPatch { status: Some(TaskStatus::Done), ..TaskPatch::default() };
    let updated = context.orchestrator().update::<Task>("t-1", patch).await.expect("update should succeed");
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.title, "Draft appeal");

    let state = state.lock().expect("state lock");
    let (method, _, body) = state.requests.last().expect("patch recorded");
    assert_eq!(method, "PATCH");
    assert_eq!(body, &json!({ "status": "Done" }));
    assert_eq!(state.tables["tasks"][0]["title"], json!("Draft appeal"));
    assert_eq!(state.tables["tasks"][0]["status"], json!("Done"));
}

#[tokio::test]
async fn delete_is_idempotent_against_the_service() {
    let state: Shared = Arc::new(Mutex::new(seeded_tables()));
    let url = serve(state.clone()).await;
    let dir = TempDir::new().expect("tempdir should be created");
    let context = open(&url, &dir).await;

    context.orchestrator().delete::<Client>("7").await.expect("first delete");
    context.orchestrator().delete::<Client>("7").await.expect("second delete");
    assert!(context.store().clients().is_empty());
    assert!(state.lock().expect("state lock").tables["clients"].is_empty());
}

#[tokio::test]
async fn rejected_writes_surface_and_leave_the_store_alone() {
    let state: Shared = Arc::new(Mutex::new(seeded_tables()));
    let url = serve(state.clone()).await;
    let dir = TempDir::new().expect("tempdir should be created");
    let context = open(&url, &dir).await;
    state.lock().expect("state lock").fail_writes = true;
    let before = context.store().tasks();

    let patch = TaskPatch { title: Some("Renamed".into()), ..TaskPatch::default() };
    let error = context.orchestrator().update::<Task>("t-1", patch).await.expect_err("write is rejected");
    match error {
        SyncError::Backend(BackendError::Http { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "write rejected");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let error = context.orchestrator().add(LegalDocument::default()).await.expect_err("insert is rejected");
    assert!(matches!(error, SyncError::Backend(_)));

    assert_eq!(context.store().tasks(), before);
    assert!(context.store().documents().is_empty());
}

#[tokio::test]
async fn failed_startup_read_falls_back_to_local_data() {
    let state: Shared = Arc::new(Mutex::new(FakeTables { fail_reads: true, ..seeded_tables() }));
    let url = serve(state.clone()).await;
    let dir = TempDir::new().expect("tempdir should be created");
    let context = open(&url, &dir).await;

    assert_eq!(context.backend_kind(), BackendKind::Remote);
    let report = context.load_report();
    assert_eq!(report.cases, LoadSource::Seed);
    assert!(report.remote_error.as_deref().is_some_and(|error| error.contains("503")));
    assert_eq!(context.store().clients().len(), 4);
}

#[tokio::test]
async fn unreachable_service_falls_back_without_failing_startup() {
    let dir = TempDir::new().expect("tempdir should be created");
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let url = format!("http://{}", listener.local_addr().expect("addr"));
    drop(listener);

    let context = open(&url, &dir).await;
    assert_eq!(context.load_report().tasks, LoadSource::Seed);
    assert!(context.load_report().remote_error.is_some());
}
