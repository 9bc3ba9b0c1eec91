//! In-process fake of the recruiting backend, served on an ephemeral port

#![allow(dead_code)]

use axum::body::Body;
use axum::extract::{Multipart, Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use talent_client::{ApiClient, AuthSession, StateMedium};

pub const TOKEN: &str = "test-token";
pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
pub struct BackendState {
    pub requests: Vec<Recorded>,
    pub companies: Vec<Value>,
    pub candidates: Vec<Value>,
    pub drafts: Vec<Value>,
    pub undeletable: BTreeSet<i64>,
    next_id: i64,
}

type Shared = Arc<Mutex<BackendState>>;

pub struct FakeBackend {
    pub base_url: String,
    pub state: Shared,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(BackendState {
            companies: default_companies(),
            next_id: 1000,
            ..BackendState::default()
        }));

        let app = Router::new()
            .route("/api/login", post(login))
            .route("/api/companies", get(list_companies))
            .route("/api/companies/:id", delete(delete_company))
            .route("/api/resume/list", get(list_resumes))
            .route("/api/resume/batch", delete(batch_delete_resumes))
            .route("/api/resume/:id", get(get_resume))
            .route("/api/positions/:id/candidates", get(position_candidates))
            .route("/api/resume/upload_with_kimi", post(upload_resume))
            .route("/api/resume/draft/list", get(list_drafts))
            .route("/api/resume/draft/:id", get(get_draft).put(put_draft))
            .route("/api/resume/draft/:id/confirm", post(confirm_draft))
            .route("/api/analyze_jd_stream", post(analyze_stream))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api", addr),
            state,
        }
    }

    /// Client with a fresh in-memory session
    pub async fn client(&self, medium: &StateMedium) -> ApiClient {
        let session = AuthSession::restore(medium.clone()).await;
        ApiClient::with_base_url(self.base_url.clone(), Duration::from_secs(5), session).unwrap()
    }

    pub async fn logged_in_client(&self, medium: &StateMedium) -> ApiClient {
        let client = self.client(medium).await;
        client.login("alice", PASSWORD).await.unwrap();
        client
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.path == path)
            .cloned()
            .collect()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    pub fn set_candidates(&self, candidates: Vec<Value>) {
        self.state.lock().unwrap().candidates = candidates;
    }
}

pub fn default_companies() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Acme", "projects": [
            {"id": 10, "name": "Infra", "status": "active", "positions": [
                {"id": 100, "name": "SRE"},
                {"id": 101, "name": "DBA"}
            ]}
        ]}),
        json!({"id": 2, "name": "Globex", "projects": [
            {"id": 20, "name": "Mobile", "status": "active", "positions": [
                {"id": 200, "name": "iOS"}
            ]}
        ]}),
    ]
}

pub fn candidate(id: i64, name: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "chinese_name": name,
        "current_city": "Shanghai",
        "skills": ["Rust"],
        "created_at": created_at
    })
}

fn record(state: &Shared, method: &str, path: &str, query: Option<String>, headers: &HeaderMap) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.lock().unwrap().requests.push(Recorded {
        method: method.to_string(),
        path: path.to_string(),
        query,
        authorization,
    });
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn form_fields(mut multipart: Multipart) -> Vec<(String, Vec<u8>)> {
    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap().to_vec();
        fields.push((name, bytes));
    }
    fields
}

fn text_field(fields: &[(String, Vec<u8>)], name: &str) -> Option<String> {
    fields
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| String::from_utf8_lossy(v).to_string())
}

async fn login(multipart: Multipart) -> Response {
    let fields = form_fields(multipart).await;
    let username = text_field(&fields, "username").unwrap_or_default();
    if text_field(&fields, "password").as_deref() != Some(PASSWORD) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"detail": "bad credentials"}))).into_response();
    }
    Json(json!({"access_token": TOKEN, "token_type": "bearer", "username": username})).into_response()
}

async fn list_companies(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record(&state, "GET", "/companies", None, &headers);
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let companies = state.lock().unwrap().companies.clone();
    Json(json!({"success": true, "data": companies})).into_response()
}

async fn delete_company(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    record(&state, "DELETE", &format!("/companies/{}", id), None, &headers);
    state
        .lock()
        .unwrap()
        .companies
        .retain(|c| c["id"].as_i64() != Some(id));
    Json(json!({"success": true})).into_response()
}

async fn list_resumes(
    State(state): State<Shared>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    record(&state, "GET", "/resume/list", query, &headers);
    let candidates = state.lock().unwrap().candidates.clone();
    let total = candidates.len();
    Json(json!({
        "success": true,
        "data": candidates,
        "pagination": {"total": total, "total_pages": 1}
    }))
    .into_response()
}

async fn position_candidates(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    record(&state, "GET", &format!("/positions/{}/candidates", id), query, &headers);
    let candidates = state.lock().unwrap().candidates.clone();
    Json(json!({"success": true, "data": candidates})).into_response()
}

async fn get_resume(State(state): State<Shared>, Path(id): Path<i64>, headers: HeaderMap) -> Response {
    record(&state, "GET", &format!("/resume/{}", id), None, &headers);
    // Any detail request is treated as coming from a revoked session.
    (StatusCode::UNAUTHORIZED, Json(json!({"detail": "token expired"}))).into_response()
}

async fn batch_delete_resumes(
    State(state): State<Shared>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    record(&state, "DELETE", "/resume/batch", query.clone(), &headers);
    let ids: Vec<i64> = query
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.strip_prefix("resume_ids="))
        .filter_map(|id| id.parse().ok())
        .collect();

    let mut guard = state.lock().unwrap();
    let failed: Vec<i64> = ids
        .iter()
        .copied()
        .filter(|id| guard.undeletable.contains(id))
        .collect();
    guard.candidates.retain(|c| {
        let id = c["id"].as_i64().unwrap_or_default();
        !ids.contains(&id) || failed.contains(&id)
    });
    Json(json!({
        "success": failed.is_empty(),
        "message": format!("deleted {}", ids.len() - failed.len()),
        "failed_ids": failed
    }))
    .into_response()
}

async fn upload_resume(State(state): State<Shared>, multipart: Multipart) -> Response {
    let fields = form_fields(multipart).await;
    if !fields.iter().any(|(name, bytes)| name == "resume_file" && !bytes.is_empty()) {
        return (StatusCode::UNPROCESSABLE_ENTITY, "resume_file missing").into_response();
    }
    let position_id = text_field(&fields, "position_id").and_then(|p| p.parse::<i64>().ok());

    let mut guard = state.lock().unwrap();
    guard.next_id += 1;
    let id = guard.next_id;
    guard.drafts.push(json!({
        "id": id,
        "status": "pending",
        "original_filename": "resume.pdf",
        "position_id": position_id,
        "created_at": "2024-06-01T08:00:00Z",
        "basic_info": {"chinese_name": "未知", "phone": 13800000000u64},
        "work_experiences": [{"company_name": "Acme", "position": "Engineer"}]
    }));
    Json(json!({"success": true, "draft_resume_id": id})).into_response()
}

async fn list_drafts(
    State(state): State<Shared>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    record(&state, "GET", "/resume/draft/list", query.clone(), &headers);
    let wanted = query
        .unwrap_or_default()
        .split('&')
        .find_map(|pair| pair.strip_prefix("status=").map(str::to_string));
    let drafts: Vec<Value> = state
        .lock()
        .unwrap()
        .drafts
        .iter()
        .filter(|d| match &wanted {
            Some(status) => d["status"].as_str() == Some(status.as_str()),
            None => true,
        })
        .cloned()
        .collect();
    let total = drafts.len();
    Json(json!({"success": true, "data": drafts, "pagination": {"total": total, "total_pages": 1}}))
        .into_response()
}

fn find_draft(state: &Shared, id: i64) -> Option<Value> {
    state
        .lock()
        .unwrap()
        .drafts
        .iter()
        .find(|d| d["id"].as_i64() == Some(id))
        .cloned()
}

async fn get_draft(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    match find_draft(&state, id) {
        Some(draft) => Json(json!({"success": true, "data": draft})).into_response(),
        None => (StatusCode::NOT_FOUND, "no such draft").into_response(),
    }
}

async fn put_draft(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut guard = state.lock().unwrap();
    let Some(slot) = guard.drafts.iter_mut().find(|d| d["id"].as_i64() == Some(id)) else {
        return (StatusCode::NOT_FOUND, "no such draft").into_response();
    };
    let status = slot["status"].clone();
    if let Some(object) = body.as_object_mut() {
        object.remove("draft_status");
        object.insert("status".into(), status);
    }
    *slot = body;
    Json(json!({"success": true, "message": "updated"})).into_response()
}

async fn confirm_draft(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut guard = state.lock().unwrap();
    let Some(slot) = guard.drafts.iter_mut().find(|d| d["id"].as_i64() == Some(id)) else {
        return (StatusCode::NOT_FOUND, "no such draft").into_response();
    };
    slot["status"] = json!("confirmed");
    let name = slot["basic_info"]["chinese_name"].clone();
    guard.candidates.insert(
        0,
        json!({
            "id": id + 5000,
            "chinese_name": name,
            "created_at": "2024-06-02T09:00:00Z"
        }),
    );
    Json(json!({"success": true, "data": {"resume_id": id + 5000}})).into_response()
}

fn sse_event(name: &str, data: Value) -> String {
    format!("event: {}\ndata: {}\n\n", name, data)
}

async fn analyze_stream(multipart: Multipart) -> Response {
    let fields = form_fields(multipart).await;
    let request_id = text_field(&fields, "request_id").unwrap_or_default();
    let info = text_field(&fields, "supplementary_info").unwrap_or_default();

    if info == "slow" {
        tokio::time::sleep(Duration::from_millis(800)).await;
    }

    let events = vec![
        sse_event(
            "keywords_result",
            json!({"request_id": "someone-else", "payload": {"job_title": "stale"}}),
        ),
        sse_event(
            "keywords_result",
            json!({"request_id": request_id, "payload": {"job_title": info, "skills": ["Rust", "SQL"]}}),
        ),
        sse_event(
            "diagram_result",
            json!({"request_id": request_id, "mermaid_code": "graph TD; A-->B"}),
        ),
    ];

    // Split mid-line so the client has to carry partial lines over.
    let body = events.concat().into_bytes();
    let (head, tail) = body.split_at(body.len() / 2);
    let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![Ok(head.to_vec()), Ok(tail.to_vec())];
    Response::builder()
        .header("content-type", "text/event-stream")
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap()
}
