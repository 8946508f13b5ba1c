use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Behaviour of the fake LangGraph deployment
#[derive(Default)]
pub struct FakeAgentState {
    /// `(event, data)` frames returned by every run
    pub events: Vec<(String, String)>,
    /// Keep the stream open after the scripted frames
    pub hang_after_events: bool,
    /// Answer runs with this status instead of a stream
    pub run_status: Option<StatusCode>,
    /// Expected `x-api-key` header value
    pub api_key: Option<String>,
    pub threads_created: AtomicUsize,
    pub runs: Mutex<Vec<(String, Value)>>,
}

impl FakeAgentState {
    fn authorized(&self, headers: &HeaderMap) -> bool {
        match &self.api_key {
            Some(expected) => headers
                .get("x-api-key")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == expected),
            None => true,
        }
    }
}

pub struct FakeAgentServer {
    pub base_url: String,
    pub state: Arc<FakeAgentState>,
}

impl FakeAgentServer {
    pub async fn start(state: FakeAgentState) -> Self {
        let state = Arc::new(state);

        let app = Router::new()
            .route("/threads", post(create_thread))
            .route("/threads/:thread_id/runs/stream", post(stream_run))
            .with_state(state.clone());

        // Start server on random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeAgentServer {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn threads_created(&self) -> usize {
        self.state.threads_created.load(Ordering::SeqCst)
    }

    pub fn runs(&self) -> Vec<(String, Value)> {
        self.state.runs.lock().unwrap().clone()
    }
}

/// Frames for a partial event whose last message has the given content
pub fn partial(content: Value) -> (String, String) {
    let messages = json!([
        { "type": "human", "content": "ignored" },
        { "type": "ai", "id": "run-1", "content": content },
    ]);
    ("messages/partial".to_string(), messages.to_string())
}

pub fn complete() -> (String, String) {
    ("messages/complete".to_string(), "[]".to_string())
}

pub fn metadata() -> (String, String) {
    ("metadata".to_string(), json!({ "run_id": "run-1" }).to_string())
}

async fn create_thread(
    State(state): State<Arc<FakeAgentState>>,
    headers: HeaderMap,
) -> Response {
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }
    let n = state.threads_created.fetch_add(1, Ordering::SeqCst) + 1;
    Json(json!({ "thread_id": format!("thread-{}", n), "status": "idle" })).into_response()
}

async fn stream_run(
    State(state): State<Arc<FakeAgentState>>,
    Path(thread_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "invalid api key").into_response();
    }
    state.runs.lock().unwrap().push((thread_id, body));

    if let Some(status) = state.run_status {
        return (status, "upstream unavailable").into_response();
    }

    let frames: Vec<Result<Event, Infallible>> = state
        .events
        .iter()
        .map(|(event, data)| Ok(Event::default().event(event).data(data)))
        .collect();

    if state.hang_after_events {
        Sse::new(stream::iter(frames).chain(stream::pending())).into_response()
    } else {
        Sse::new(stream::iter(frames)).into_response()
    }
}
