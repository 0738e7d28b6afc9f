//! Stub backend for client tests
//!
//! An axum app bound to an ephemeral port that records every request and
//! answers with canned responses keyed by method and path.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use campus_api::{ApiClient, MemorySessionStore, RecordingNotifier};
use campus_core::ApiConfig;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("request body is not JSON")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Whether a multipart body carries a text field `name` with `value`
    pub fn has_form_field(&self, name: &str, value: &str) -> bool {
        let body = self.body_text();
        let header = format!("name=\"{}\"", name);
        body.split("Content-Disposition: form-data; ")
            .filter(|section| section.starts_with(&header))
            .any(|section| {
                section
                    .split("\r\n\r\n")
                    .nth(1)
                    .map(|rest| rest.split("\r\n").next() == Some(value))
                    .unwrap_or(false)
            })
    }

    pub fn form_field_count(&self, name: &str) -> usize {
        self.body_text()
            .matches(&format!("name=\"{}\"", name))
            .count()
    }
}

#[derive(Clone, Default)]
struct StubState {
    routes: Arc<Mutex<HashMap<(Method, String), (StatusCode, Value)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubBackend {
    pub base_url: String,
    state: StubState,
}

impl StubBackend {
    pub async fn start() -> Self {
        let state = StubState::default();
        let app = Router::new().fallback(respond).with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/api/", addr),
            state,
        }
    }

    /// Answer `method path` (path relative to `/api/`) with `status` and `body`
    pub fn on(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, format!("/api/{}", path.trim_start_matches('/'))), (status, body));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().last().cloned().expect("no request recorded")
    }

    pub fn requests_to(&self, method: Method, path: &str) -> Vec<RecordedRequest> {
        let full = format!("/api/{}", path.trim_start_matches('/'));
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == full)
            .collect()
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url.clone(),
            ..ApiConfig::default()
        }
    }
}

async fn respond(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header("authorization"),
        content_type: header("content-type"),
        body,
    });

    let canned = state
        .routes
        .lock()
        .unwrap()
        .get(&(method, uri.path().to_string()))
        .cloned();

    match canned {
        Some((status, body)) => (status, Json(body)),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "No stub registered"})),
        ),
    }
}

/// Client wired to the stub, with its store and notifier exposed
pub struct TestClient {
    pub client: ApiClient,
    pub session: Arc<MemorySessionStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestClient {
    pub fn new(config: ApiConfig) -> Self {
        let session = Arc::new(MemorySessionStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let client = ApiClient::new(config, session.clone(), notifier.clone()).unwrap();
        Self {
            client,
            session,
            notifier,
        }
    }
}
