//! Integration tests for the REST client and dashboard controller.
//!
//! Each test spins up an in-memory Axum backend on a random port that speaks
//! the Master Agent REST contract, then drives the real `HttpApi` and
//! `Dashboard` against it.

use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use master_agent::api::{AgentApi, HttpApi, NoteUpdate, TaskStatus};
use master_agent::cli::{Cli, parse_command};
use master_agent::dashboard::{Dashboard, GoalForm, NoteForm, Tab, TaskForm};
use master_agent::error::ApiError;
use master_agent::voice::{RecordedClip, encode_wav};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const CREATED_AT: &str = "2025-01-01T09:00:00.000001";

// ── Mock backend ────────────────────────────────────────────────────────

#[derive(Default)]
struct Backend {
    tasks: Vec<Value>,
    goals: Vec<Value>,
    notes: Vec<Value>,
    /// Oldest first.
    conversations: Vec<Value>,
    next_id: i64,
    /// `METHOD /path` of every request, in arrival order.
    requests: Vec<String>,
    /// JSON bodies of every mutation, in arrival order.
    bodies: Vec<Value>,
    /// Multipart fields of the last voice upload: name → (file name, content type, bytes).
    voice_parts: HashMap<String, (Option<String>, Option<String>, Vec<u8>)>,
    /// Answer voice uploads with 400, as the backend does for unusable audio.
    reject_voice: bool,
}

impl Backend {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn collection(&mut self, kind: &str) -> Option<&mut Vec<Value>> {
        match kind {
            "tasks" => Some(&mut self.tasks),
            "goals" => Some(&mut self.goals),
            "notes" => Some(&mut self.notes),
            _ => None,
        }
    }
}

type Shared = Arc<Mutex<Backend>>;

fn defaults(kind: &str) -> Value {
    match kind {
        "tasks" => json!({
            "description": "", "status": "pending", "priority": "medium", "due_date": null
        }),
        "goals" => json!({
            "description": "", "target_date": null, "progress": 0, "status": "active"
        }),
        _ => json!({
            "title": "", "content": "", "note_type": "text", "audio_file_path": null,
            "transcription": "", "tags": []
        }),
    }
}

/// Apply request fields onto a record the way the backend does: dates
/// arrive as `YYYY-MM-DD` and are stored as midnight timestamps.
fn merge(record: &mut Value, body: &Value) {
    let Some(fields) = body.as_object() else {
        return;
    };
    for (key, value) in fields {
        let value = match (key.as_str(), value.as_str()) {
            ("due_date" | "target_date", Some(date)) => json!(format!("{date}T00:00:00")),
            _ => value.clone(),
        };
        record[key.as_str()] = value;
    }
}

async fn list(
    State(s): State<Shared>,
    Path(kind): Path<String>,
    Query(q): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let mut b = s.lock().unwrap();
    let user = q.get("user_id").cloned().unwrap_or_default();
    b.requests.push(format!("GET /{kind}?user_id={user}"));
    let items = b.collection(&kind).ok_or(StatusCode::NOT_FOUND)?.clone();
    Ok(Json(Value::Array(items)))
}

async fn create(
    State(s): State<Shared>,
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let mut b = s.lock().unwrap();
    b.requests.push(format!("POST /{kind}"));
    b.bodies.push(body.clone());

    let id = b.next_id();
    let mut record = defaults(&kind);
    merge(&mut record, &body);
    record["id"] = json!(id);
    record["created_at"] = json!(CREATED_AT);
    record["updated_at"] = json!(CREATED_AT);

    b.collection(&kind)
        .ok_or(StatusCode::NOT_FOUND)?
        .push(record.clone());
    Ok((StatusCode::CREATED, Json(record)))
}

async fn update(
    State(s): State<Shared>,
    Path((kind, id)): Path<(String, i64)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut b = s.lock().unwrap();
    b.requests.push(format!("PUT /{kind}/{id}"));
    b.bodies.push(body.clone());

    let record = b
        .collection(&kind)
        .ok_or(StatusCode::NOT_FOUND)?
        .iter_mut()
        .find(|r| r["id"] == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    merge(record, &body);
    Ok(Json(record.clone()))
}

async fn remove(State(s): State<Shared>, Path((kind, id)): Path<(String, i64)>) -> StatusCode {
    let mut b = s.lock().unwrap();
    b.requests.push(format!("DELETE /{kind}/{id}"));
    let Some(items) = b.collection(&kind) else {
        return StatusCode::NOT_FOUND;
    };
    let before = items.len();
    items.retain(|r| r["id"] != id);
    if items.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn dashboard(
    State(s): State<Shared>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut b = s.lock().unwrap();
    let user = q.get("user_id").cloned().unwrap_or_default();
    b.requests.push(format!("GET /dashboard?user_id={user}"));

    let count = |items: &[Value], key: &str, value: &str| {
        items.iter().filter(|r| r[key] == value).count()
    };
    let recent = |items: &[Value]| items.iter().rev().take(5).cloned().collect::<Vec<_>>();

    Json(json!({
        "tasks": {
            "total": b.tasks.len(),
            "completed": count(&b.tasks, "status", "completed"),
            "pending": count(&b.tasks, "status", "pending"),
            "recent": recent(&b.tasks),
        },
        "goals": {
            "total": b.goals.len(),
            "active": count(&b.goals, "status", "active"),
            "completed": count(&b.goals, "status", "completed"),
        },
        "notes": {
            "total": b.notes.len(),
            "text": count(&b.notes, "note_type", "text"),
            "voice": count(&b.notes, "note_type", "voice"),
            "recent": recent(&b.notes),
        }
    }))
}

async fn conversations(
    State(s): State<Shared>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    let mut b = s.lock().unwrap();
    let user = q.get("user_id").cloned().unwrap_or_default();
    let limit: usize = q.get("limit").and_then(|l| l.parse().ok()).unwrap_or(50);
    b.requests
        .push(format!("GET /conversations?user_id={user}&limit={limit}"));
    let newest_first: Vec<Value> = b.conversations.iter().rev().take(limit).cloned().collect();
    Json(Value::Array(newest_first))
}

async fn chat(State(s): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut b = s.lock().unwrap();
    b.requests.push("POST /chat".into());
    b.bodies.push(body.clone());

    let id = b.next_id();
    let message = body["message"].as_str().unwrap_or_default().to_string();
    let response = format!("I understand you're asking about: {message}");
    b.conversations.push(json!({
        "id": id,
        "message": message,
        "response": response,
        "message_type": "text",
        "created_at": CREATED_AT,
        "user_id": body["user_id"],
    }));
    Json(json!({ "response": response, "conversation_id": id }))
}

async fn voice(
    State(s): State<Shared>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    let mut parts = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        parts.insert(name, (file_name, content_type, bytes.to_vec()));
    }

    let text = |name: &str| {
        parts
            .get(name)
            .map(|(_, _, bytes)| String::from_utf8_lossy(bytes).to_string())
            .unwrap_or_default()
    };
    let title = text("title");
    let user_id: i64 = text("user_id").parse().unwrap_or(1);

    let mut b = s.lock().unwrap();
    b.requests.push("POST /notes/voice".into());
    if b.reject_voice || !parts.contains_key("audio") {
        return Err(StatusCode::BAD_REQUEST);
    }
    b.voice_parts = parts;

    let id = b.next_id();
    let note = json!({
        "id": id,
        "title": title,
        "content": null,
        "note_type": "voice",
        "audio_file_path": format!("/uploads/voice_notes/{id}.wav"),
        "transcription": "hello from the clip",
        "tags": [],
        "created_at": CREATED_AT,
        "updated_at": CREATED_AT,
        "user_id": user_id,
    });
    b.notes.push(note.clone());
    Ok((StatusCode::CREATED, Json(note)))
}

fn backend_routes(state: Shared) -> Router {
    let api = Router::new()
        .route("/dashboard", get(dashboard))
        .route("/conversations", get(conversations))
        .route("/chat", post(chat))
        .route("/notes/voice", post(voice))
        .route("/{kind}", get(list).post(create))
        .route("/{kind}/{id}", put(update).delete(remove))
        .with_state(state);
    Router::new().nest("/api", api)
}

async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    format!("http://127.0.0.1:{port}/api")
}

/// Start the mock backend, return (base url, shared backend state).
async fn start_server() -> (String, Shared) {
    let state = Shared::default();
    let base = serve(backend_routes(Arc::clone(&state))).await;
    (base, state)
}

/// A backend that answers every request with HTTP 500.
async fn start_failing_server() -> String {
    let app = Router::new().fallback(|| async {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "database is down" })),
        )
    });
    serve(app).await
}

fn client(base: &str) -> Arc<HttpApi> {
    Arc::new(HttpApi::new(base, Duration::from_secs(2)))
}

fn dashboard_for(base: &str) -> Dashboard {
    Dashboard::new(client(base) as Arc<dyn AgentApi>, 1, 20)
}

fn seed(state: &Shared) {
    let mut b = state.lock().unwrap();
    b.tasks.push(json!({
        "id": 100, "title": "Existing task", "description": "", "status": "completed",
        "priority": "low", "due_date": null, "created_at": CREATED_AT, "updated_at": CREATED_AT,
        "user_id": 1
    }));
    b.goals.push(json!({
        "id": 200, "title": "Existing goal", "description": null, "target_date": null,
        "progress": 30, "status": "active", "created_at": CREATED_AT, "updated_at": CREATED_AT,
        "user_id": 1
    }));
    b.conversations.push(json!({
        "id": 1, "message": "first", "response": "one", "message_type": "text",
        "created_at": "2025-01-01T08:00:00", "user_id": 1
    }));
    b.conversations.push(json!({
        "id": 2, "message": "second", "response": "two", "message_type": "text",
        "created_at": "2025-01-01T08:05:00", "user_id": 1
    }));
}

fn requests(state: &Shared) -> Vec<String> {
    state.lock().unwrap().requests.clone()
}

fn last_body(state: &Shared) -> Value {
    state.lock().unwrap().bodies.last().cloned().unwrap()
}

// ── Loads ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_all_reads_every_resource() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        seed(&state);
        let dash = dashboard_for(&base);

        dash.load_all().await;

        let view = dash.snapshot().await;
        assert_eq!(view.tasks.len(), 1);
        assert_eq!(view.tasks[0].status, TaskStatus::Completed);
        assert_eq!(view.goals[0].progress, 30);
        assert!(view.notes.is_empty());
        assert_eq!(view.summary.tasks.total, 1);
        assert_eq!(view.summary.tasks.completed, 1);
        assert_eq!(view.summary.goals.active, 1);

        // Server sends newest first; the transcript reads oldest first.
        let messages: Vec<&str> = view.chat.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, ["first", "second"]);

        let reqs = requests(&state);
        assert_eq!(reqs.len(), 5);
        for expected in [
            "GET /dashboard?user_id=1",
            "GET /tasks?user_id=1",
            "GET /goals?user_id=1",
            "GET /notes?user_id=1",
            "GET /conversations?user_id=1&limit=20",
        ] {
            assert!(reqs.contains(&expected.to_string()), "missing {expected}");
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn off_contract_rows_still_load() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        seed(&state);
        {
            let mut b = state.lock().unwrap();
            b.tasks[0]["status"] = json!("blocked");
            b.tasks[0]["priority"] = json!(null);
            b.goals[0]["progress"] = json!(-5);
            b.goals.push(json!({
                "id": 201, "title": "Unset", "progress": null, "status": "archived",
                "created_at": CREATED_AT, "updated_at": CREATED_AT, "user_id": 1
            }));
        }
        let dash = dashboard_for(&base);

        dash.load_all().await;

        let view = dash.snapshot().await;
        assert_eq!(view.tasks.len(), 1);
        assert_eq!(view.tasks[0].status, TaskStatus::Unknown);
        assert_eq!(view.summary.tasks.recent.len(), 1);
        assert_eq!(view.goals.len(), 2);
        assert_eq!(view.goals[0].progress, -5);
        assert_eq!(view.goals[0].percent(), 0);
        assert_eq!(view.goals[1].progress, 0);
        assert_eq!(view.summary.goals.total, 2);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn failing_backend_leaves_view_empty() {
    timeout(TEST_TIMEOUT, async {
        let base = start_failing_server().await;
        let dash = dashboard_for(&base);

        dash.load_all().await;
        assert!(dash.create_task(TaskForm::new("Anything")).await.is_none());
        assert!(dash.send_message("hello?").await.is_none());

        let view = dash.snapshot().await;
        assert!(view.tasks.is_empty());
        assert!(view.chat.is_empty());
        assert!(!view.loading);
        assert_eq!(view.summary.tasks.total, 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn http_errors_carry_status_and_body() {
    timeout(TEST_TIMEOUT, async {
        let base = start_failing_server().await;
        let err = client(&base).list_goals(1).await.unwrap_err();
        match err {
            ApiError::Status { status, body, .. } => {
                assert_eq!(status, 500);
                assert!(body.contains("database is down"));
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    })
    .await
    .expect("test timed out");
}

// ── Tasks ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_task_posts_form_and_refetches() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        let dash = dashboard_for(&base);

        let form = TaskForm {
            title: "Renew passport".into(),
            description: "photos first".into(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 31),
            ..Default::default()
        };
        let created = dash.create_task(form).await.expect("task created");
        assert_eq!(created.title, "Renew passport");

        assert_eq!(
            last_body(&state),
            json!({
                "title": "Renew passport",
                "description": "photos first",
                "priority": "medium",
                "due_date": "2025-01-31",
                "user_id": 1
            })
        );

        let reqs = requests(&state);
        assert_eq!(reqs[0], "POST /tasks");
        assert!(reqs.contains(&"GET /tasks?user_id=1".to_string()));
        assert!(reqs.contains(&"GET /dashboard?user_id=1".to_string()));

        let view = dash.snapshot().await;
        assert_eq!(view.tasks.len(), 1);
        assert_eq!(
            view.tasks[0].due_date.map(|d| d.date()),
            NaiveDate::from_ymd_opt(2025, 1, 31)
        );
        assert_eq!(view.summary.tasks.pending, 1);
        assert_eq!(view.summary.tasks.recent.len(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn complete_and_delete_task() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        seed(&state);
        state.lock().unwrap().tasks[0]["status"] = json!("pending");
        let dash = dashboard_for(&base);

        let done = dash.complete_task(100).await.expect("task updated");
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(last_body(&state), json!({ "status": "completed" }));
        assert_eq!(dash.snapshot().await.summary.tasks.completed, 1);

        assert!(dash.delete_task(100).await);
        assert!(requests(&state).contains(&"DELETE /tasks/100".to_string()));
        let view = dash.snapshot().await;
        assert!(view.tasks.is_empty());
        assert_eq!(view.summary.tasks.total, 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn deleting_missing_task_is_not_found() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        let err = client(&base).delete_task(999).await.unwrap_err();
        assert_eq!(err.status(), Some(404));

        // The controller swallows it and skips the refetch.
        let dash = dashboard_for(&base);
        assert!(!dash.delete_task(999).await);
        assert_eq!(
            requests(&state),
            ["DELETE /tasks/999", "DELETE /tasks/999"]
        );
    })
    .await
    .expect("test timed out");
}

// ── Goals ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn goal_create_and_progress() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        let dash = dashboard_for(&base);

        let form = GoalForm {
            title: "Run 10k".into(),
            target_date: NaiveDate::from_ymd_opt(2025, 9, 1),
            ..Default::default()
        };
        let goal = dash.create_goal(form).await.expect("goal created");
        assert_eq!(goal.progress, 0);
        assert_eq!(last_body(&state)["target_date"], "2025-09-01");
        assert_eq!(last_body(&state)["progress"], 0);

        let before = requests(&state).len();
        assert!(dash.update_goal_progress(goal.id, 150).await.is_none());
        assert_eq!(requests(&state).len(), before);

        let updated = dash.update_goal_progress(goal.id, 60).await.expect("progress");
        assert_eq!(updated.progress, 60);
        assert_eq!(last_body(&state), json!({ "progress": 60 }));
        assert_eq!(dash.snapshot().await.goals[0].progress, 60);

        assert!(dash.delete_goal(goal.id).await);
        assert!(dash.snapshot().await.goals.is_empty());
    })
    .await
    .expect("test timed out");
}

// ── Notes ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn text_note_lifecycle() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        let dash = dashboard_for(&base);

        let form = NoteForm {
            title: "Books".into(),
            content: "Dune, Emma".into(),
            tags: vec!["reading".into()],
        };
        let note = dash.create_note(form).await.expect("note created");
        assert_eq!(
            last_body(&state),
            json!({ "title": "Books", "content": "Dune, Emma", "tags": ["reading"], "user_id": 1 })
        );

        let update = NoteUpdate {
            content: Some("Dune, Emma, Ulysses".into()),
            ..Default::default()
        };
        let updated = dash.update_note(note.id, update).await.expect("note updated");
        assert_eq!(updated.content.as_deref(), Some("Dune, Emma, Ulysses"));
        assert_eq!(last_body(&state), json!({ "content": "Dune, Emma, Ulysses" }));

        let view = dash.snapshot().await;
        assert_eq!(view.notes[0].tags, ["reading"]);
        assert_eq!(view.summary.notes.text, 1);

        assert!(dash.delete_note(note.id).await);
        assert!(dash.snapshot().await.notes.is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn voice_note_uploads_multipart() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        let dash = dashboard_for(&base);

        let wav = encode_wav(&vec![0i16; 8_000], 8_000, 1);
        let note = dash
            .upload_voice_note(RecordedClip::wav(wav.clone()))
            .await
            .expect("voice note uploaded");
        assert_eq!(note.transcription.as_deref(), Some("hello from the clip"));

        {
            let b = state.lock().unwrap();
            let (file_name, content_type, bytes) = &b.voice_parts["audio"];
            assert_eq!(file_name.as_deref(), Some("voice_note.wav"));
            assert_eq!(content_type.as_deref(), Some("audio/wav"));
            assert_eq!(bytes, &wav);
            assert_eq!(b.voice_parts["user_id"].2, b"1");
            let title = String::from_utf8_lossy(&b.voice_parts["title"].2).to_string();
            assert!(title.starts_with("Voice Note "), "title was {title}");
        }

        let view = dash.snapshot().await;
        assert_eq!(view.notes.len(), 1);
        assert_eq!(view.summary.notes.voice, 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn rejected_voice_upload_does_not_refresh() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        state.lock().unwrap().reject_voice = true;
        let dash = dashboard_for(&base);

        let wav = encode_wav(&vec![0i16; 8_000], 8_000, 1);
        assert!(dash.upload_voice_note(RecordedClip::wav(wav)).await.is_none());

        assert_eq!(requests(&state), ["POST /notes/voice"]);
        let view = dash.snapshot().await;
        assert!(view.notes.is_empty());
        assert_eq!(view.summary.notes.total, 0);
    })
    .await
    .expect("test timed out");
}

// ── Chat ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn chat_appends_then_history_agrees() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        seed(&state);
        let dash = dashboard_for(&base);
        dash.load_conversations().await;

        let turn = dash.send_message("plan my week").await.expect("reply");
        assert_eq!(
            turn.response.as_deref(),
            Some("I understand you're asking about: plan my week")
        );
        assert_eq!(
            last_body(&state),
            json!({ "message": "plan my week", "user_id": 1 })
        );

        let local: Vec<String> = dash.snapshot().await.chat.into_iter().map(|t| t.message).collect();
        dash.load_conversations().await;
        let fetched: Vec<String> = dash.snapshot().await.chat.into_iter().map(|t| t.message).collect();
        assert_eq!(local, ["first", "second", "plan my week"]);
        assert_eq!(local, fetched);
    })
    .await
    .expect("test timed out");
}

// ── CLI ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn cli_commands_drive_dashboard() {
    timeout(TEST_TIMEOUT, async {
        let (base, state) = start_server().await;
        let dash = Arc::new(dashboard_for(&base));
        let mut cli = Cli::new(Arc::clone(&dash), None);

        let flow = cli.execute(parse_command("/task add Buy milk | 2% | high")).await;
        assert_eq!(flow, ControlFlow::Continue(()));
        let view = dash.snapshot().await;
        assert_eq!(view.active_tab, Tab::Tasks);
        assert_eq!(view.tasks[0].title, "Buy milk");
        assert_eq!(last_body(&state)["priority"], "high");

        let _ = cli.execute(parse_command("/task done 1")).await;
        assert_eq!(dash.snapshot().await.tasks[0].status, TaskStatus::Completed);

        // No audio source configured: alert only, no request.
        let before = requests(&state).len();
        let _ = cli.execute(parse_command("/record")).await;
        assert_eq!(requests(&state).len(), before);

        assert_eq!(cli.execute(parse_command("/quit")).await, ControlFlow::Break(()));
    })
    .await
    .expect("test timed out");
}
