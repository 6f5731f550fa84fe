//! In-process fake of the REST backend.
//!
//! `FakeApi` serves a small jobs/applications/auth surface on a random local
//! port and records every request it receives, so tests can assert exactly
//! how many calls a workflow made and what they carried.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use backoffice::api::RemoteBackend;
use backoffice::models::QueryParams;
use backoffice::Credentials;

pub const ADMIN_TOKEN: &str = "fake-admin-token";
pub const ADMIN_PASSWORD: &str = "correct-horse";

/// One request as the fake server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Default)]
struct Inner {
    jobs: Vec<Value>,
    users: Vec<Value>,
    requests: Vec<RecordedRequest>,
    overrides: HashMap<(Method, String), (StatusCode, Value)>,
    delay: Option<Duration>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct FakeState {
    inner: Arc<Mutex<Inner>>,
}

pub struct FakeApi {
    pub base_url: String,
    state: FakeState,
    handle: JoinHandle<()>,
}

impl FakeApi {
    pub async fn start() -> Self {
        let state = FakeState::default();
        {
            let mut inner = state.inner.lock().unwrap();
            inner.users.push(super::builders::user_json("u-admin", "admin@example.com", "admin"));
            inner.users.push(super::builders::user_json("u-viewer", "viewer@example.com", "viewer"));
        }

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake api");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake api server");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn backend(&self, credentials: Credentials) -> RemoteBackend {
        self.backend_with_timeout(credentials, Duration::from_secs(5))
    }

    pub fn backend_with_timeout(&self, credentials: Credentials, timeout: Duration) -> RemoteBackend {
        RemoteBackend::builder()
            .base_url(&self.base_url)
            .timeout(timeout)
            .credentials(credentials)
            .build()
            .expect("remote backend")
    }

    pub fn add_job(&self, job: Value) {
        self.state.inner.lock().unwrap().jobs.push(job);
    }

    pub fn job(&self, id: &str) -> Option<Value> {
        let inner = self.state.inner.lock().unwrap();
        inner.jobs.iter().find(|j| j["id"] == id).cloned()
    }

    /// Answers `method path` with a fixed response instead of the default route.
    pub fn respond_with(&self, method: Method, path: &str, status: u16, body: Value) {
        let status = StatusCode::from_u16(status).expect("status");
        self.state
            .inner
            .lock()
            .unwrap()
            .overrides
            .insert((method, path.to_string()), (status, body));
    }

    /// Delays every response.
    pub fn set_delay(&self, delay: Duration) {
        self.state.inner.lock().unwrap().delay = Some(delay);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.inner.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn reset_requests(&self) {
        self.state.inner.lock().unwrap().requests.clear();
    }
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(
    State(state): State<FakeState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: QueryParams::parse_query_string(uri.query().unwrap_or("")),
        content_type: header("content-type"),
        authorization: header("authorization"),
        body: body.to_vec(),
    };

    let delay = {
        let mut inner = state.inner.lock().unwrap();
        inner.requests.push(recorded.clone());
        inner.delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut inner = state.inner.lock().unwrap();
    if let Some((status, body)) = inner
        .overrides
        .get(&(method.clone(), recorded.path.clone()))
        .cloned()
    {
        return (status, Json(body)).into_response();
    }

    let segments: Vec<&str> = recorded.path.trim_matches('/').split('/').collect();
    match (method.as_str(), segments.as_slice()) {
        ("GET", ["Job"]) => {
            let active = recorded.query.get("isActive").map(|v| v == "true");
            let jobs: Vec<Value> = inner
                .jobs
                .iter()
                .filter(|j| active.is_none_or(|a| j["isActive"] == a))
                .cloned()
                .collect();
            Json(page(jobs, &recorded.query)).into_response()
        }
        ("GET", ["Job", id]) => match inner.jobs.iter().find(|j| j["id"] == *id) {
            Some(job) => Json(success(job.clone())).into_response(),
            None => not_found("Job"),
        },
        ("PUT", ["Job", id]) => {
            let update = recorded.json();
            match inner.jobs.iter_mut().find(|j| j["id"] == *id) {
                Some(job) => {
                    if let (Some(job), Some(update)) = (job.as_object_mut(), update.as_object()) {
                        for (k, v) in update {
                            job.insert(k.clone(), v.clone());
                        }
                    }
                    Json(success(job.clone())).into_response()
                }
                None => not_found("Job"),
            }
        }
        ("POST", ["applications"]) => {
            let is_multipart = recorded
                .content_type
                .as_deref()
                .is_some_and(|ct| ct.starts_with("multipart/form-data"));
            if !is_multipart {
                return (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    Json(json!({ "message": "Expected multipart form" })),
                )
                    .into_response();
            }
            inner.next_id += 1;
            let text = recorded.body_text();
            let created = json!({
                "id": format!("app-{}", inner.next_id),
                "jobId": multipart_field(&text, "jobId").unwrap_or_default(),
                "fullName": multipart_field(&text, "fullName").unwrap_or_default(),
                "email": multipart_field(&text, "email").unwrap_or_default(),
                "status": "new",
                "createdAt": "2024-03-01T12:00:00Z"
            });
            (StatusCode::CREATED, Json(success(created))).into_response()
        }
        ("POST", ["auth", "login"]) => {
            let body = recorded.json();
            let email = body["email"].as_str().unwrap_or_default();
            let user = inner.users.iter().find(|u| u["email"] == email).cloned();
            match user {
                Some(user) if body["password"] == ADMIN_PASSWORD => Json(success(json!({
                    "user": user,
                    "accessToken": ADMIN_TOKEN,
                })))
                .into_response(),
                _ => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "message": "Invalid email or password." })),
                )
                    .into_response(),
            }
        }
        ("GET", ["auth", "me"]) => {
            if recorded.authorization.as_deref() == Some(&format!("Bearer {}", ADMIN_TOKEN)) {
                let admin = inner.users[0].clone();
                Json(success(admin)).into_response()
            } else {
                StatusCode::UNAUTHORIZED.into_response()
            }
        }
        _ => not_found("Route"),
    }
}

fn success(data: Value) -> Value {
    json!({
        "responseStatus": "SUCCESS",
        "responseMessage": "OK",
        "responseData": data,
    })
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "responseStatus": "FAILED", "responseMessage": format!("{} not found", what) })),
    )
        .into_response()
}

/// Bare pagination envelope, the shape list endpoints answer with.
fn page(items: Vec<Value>, query: &BTreeMap<String, String>) -> Value {
    let page_number: usize = query
        .get("pageNumber")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    let page_size: usize = query
        .get("pageSize")
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    let total = items.len();
    let data: Vec<Value> = items
        .into_iter()
        .skip((page_number - 1) * page_size)
        .take(page_size)
        .collect();
    json!({
        "data": data,
        "pageNumber": page_number,
        "pageSize": page_size,
        "totalCount": total,
        "totalPages": total.div_ceil(page_size),
    })
}

/// Value of a text part in a raw multipart body.
fn multipart_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{}\"", name);
    let start = body.find(&marker)? + marker.len();
    let rest = &body[start..];
    let value_start = rest.find("\r\n\r\n")? + 4;
    let value = &rest[value_start..];
    let end = value.find("\r\n")?;
    Some(value[..end].to_string())
}
