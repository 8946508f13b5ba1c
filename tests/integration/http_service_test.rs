use super::common;

use common::fake_agent_server::{complete, metadata, partial, FakeAgentServer, FakeAgentState};
use futures::StreamExt;
use pmm_chat::config::ServiceSettings;
use pmm_chat::session::wire::RunEvent;
use pmm_chat::session::{
    AgentService, HttpAgentService, RunRequest, ServiceError, SessionClient, SubmitOutcome,
    ThreadId, ToolCallStatus,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn settings_for(url: &str) -> ServiceSettings {
    ServiceSettings {
        url: url.to_string(),
        ..Default::default()
    }
}

fn service_for(server: &FakeAgentServer) -> HttpAgentService {
    HttpAgentService::new(&settings_for(&server.base_url)).unwrap()
}

#[tokio::test]
async fn test_create_thread() {
    let server = FakeAgentServer::start(FakeAgentState::default()).await;
    let service = service_for(&server);

    let thread = service.create_thread().await.unwrap();
    assert_eq!(thread, ThreadId::new("thread-1"));
    assert_eq!(server.threads_created(), 1);
}

#[tokio::test]
async fn test_stream_run_normalises_events() {
    let server = FakeAgentServer::start(FakeAgentState {
        events: vec![metadata(), partial(json!("Hello")), complete()],
        ..Default::default()
    })
    .await;
    let service = service_for(&server);

    let request = RunRequest::user_turn(ThreadId::new("thread-9"), "pmm_agent", "hi");
    let events: Vec<RunEvent> = service
        .stream_run(request)
        .map(|item| item.unwrap())
        .collect()
        .await;

    assert_eq!(events.len(), 3);
    assert_eq!(events[0], RunEvent::Ignored("metadata".to_string()));
    assert!(matches!(&events[1], RunEvent::Partial(s) if s.text == "Hello"));
    assert_eq!(events[2], RunEvent::Complete);

    let runs = server.runs();
    assert_eq!(runs.len(), 1);
    let (thread_id, body) = &runs[0];
    assert_eq!(thread_id, "thread-9");
    assert_eq!(body["assistant_id"], "pmm_agent");
    assert_eq!(body["stream_mode"], "messages");
    assert_eq!(body["input"]["messages"], json!([{ "role": "user", "content": "hi" }]));
}

#[tokio::test]
async fn test_submit_end_to_end() {
    let tool = json!({
        "type": "tool_use",
        "id": "toolu_01",
        "name": "run_five_second_test",
        "input": { "url": "https://example.com" }
    });
    let server = FakeAgentServer::start(FakeAgentState {
        events: vec![
            metadata(),
            partial(json!([{ "type": "text", "text": "Testing" }, tool.clone()])),
            partial(json!([{ "type": "text", "text": "Testing complete: the value is unclear." }, tool])),
            complete(),
        ],
        ..Default::default()
    })
    .await;
    let client = SessionClient::new(Arc::new(service_for(&server)), "pmm_agent");

    let outcome = client.submit("Run a 5-second test on https://example.com").await;
    assert_eq!(outcome, SubmitOutcome::Completed);

    let snapshot = client.snapshot().await;
    assert_eq!(snapshot.thread_id, Some(ThreadId::new("thread-1")));
    assert_eq!(snapshot.turns.len(), 2);
    assert_eq!(snapshot.turns[1].content, "Testing complete: the value is unclear.");
    assert_eq!(snapshot.turns[1].tool_calls.len(), 1);
    assert_eq!(snapshot.turns[1].tool_calls[0].status, ToolCallStatus::Completed);

    // Second prompt lands on the same thread
    client.submit("What should I fix first?").await;
    assert_eq!(server.threads_created(), 1);
    assert_eq!(server.runs().len(), 2);
    assert_eq!(server.runs()[1].0, "thread-1");
}

#[tokio::test]
async fn test_api_key_header() {
    let server = FakeAgentServer::start(FakeAgentState {
        api_key: Some("secret".to_string()),
        ..Default::default()
    })
    .await;

    let err = service_for(&server).create_thread().await.unwrap_err();
    assert!(matches!(err, ServiceError::Api { status: 401, .. }));

    let service = service_for(&server).with_api_key("secret");
    assert!(service.create_thread().await.is_ok());
}

#[tokio::test]
async fn test_api_key_from_environment() {
    let server = FakeAgentServer::start(FakeAgentState {
        api_key: Some("from-env".to_string()),
        ..Default::default()
    })
    .await;
    std::env::set_var("PMM_CHAT_IT_API_KEY", "from-env");

    let settings = ServiceSettings {
        api_key_env: Some("PMM_CHAT_IT_API_KEY".to_string()),
        ..settings_for(&server.base_url)
    };
    let service = HttpAgentService::new(&settings).unwrap();
    assert!(service.create_thread().await.is_ok());
}

#[tokio::test]
async fn test_run_error_status_removes_placeholder() {
    let server = FakeAgentServer::start(FakeAgentState {
        run_status: Some(axum::http::StatusCode::SERVICE_UNAVAILABLE),
        ..Default::default()
    })
    .await;
    let client = SessionClient::new(Arc::new(service_for(&server)), "pmm_agent");

    let outcome = client.submit("hello").await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed("The response was interrupted. Please try again.".to_string())
    );
    let snapshot = client.snapshot().await;
    assert_eq!(snapshot.turns.len(), 1);
    assert!(!snapshot.busy);
}

#[tokio::test]
async fn test_service_error_event() {
    let server = FakeAgentServer::start(FakeAgentState {
        events: vec![
            partial(json!("Working")),
            ("error".to_string(), json!({ "error": "GraphRecursionError", "message": "Recursion limit reached" }).to_string()),
        ],
        ..Default::default()
    })
    .await;
    let client = SessionClient::new(Arc::new(service_for(&server)), "pmm_agent");

    assert!(matches!(client.submit("hello").await, SubmitOutcome::Failed(_)));
    assert_eq!(client.snapshot().await.turns.len(), 1);
}

#[tokio::test]
async fn test_idle_timeout_on_hung_stream() {
    let server = FakeAgentServer::start(FakeAgentState {
        events: vec![partial(json!("Thinking"))],
        hang_after_events: true,
        ..Default::default()
    })
    .await;
    let client = SessionClient::new(Arc::new(service_for(&server)), "pmm_agent")
        .with_idle_timeout(Some(Duration::from_millis(300)));

    let outcome = client.submit("hello").await;
    assert!(matches!(outcome, SubmitOutcome::Failed(ref m) if m.contains("stopped responding")));
    assert_eq!(client.snapshot().await.turns.len(), 1);
}

#[tokio::test]
async fn test_reset_closes_http_stream() {
    let server = FakeAgentServer::start(FakeAgentState {
        events: vec![partial(json!("Thinking"))],
        hang_after_events: true,
        ..Default::default()
    })
    .await;
    let client = SessionClient::new(Arc::new(service_for(&server)), "pmm_agent");

    let task = tokio::spawn({
        let client = client.clone();
        async move { client.submit("hello").await }
    });

    let mut updates = client.subscribe();
    tokio::time::timeout(
        Duration::from_secs(5),
        updates.wait_for(|s| s.turns.last().is_some_and(|t| t.content == "Thinking")),
    )
    .await
    .unwrap()
    .unwrap();

    client.reset().await;
    let outcome = tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Discarded);
    assert!(client.snapshot().await.turns.is_empty());
}

#[tokio::test]
async fn test_unreachable_service() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let service = HttpAgentService::new(&settings_for(&format!("http://{}", addr))).unwrap();
    let client = SessionClient::new(Arc::new(service), "pmm_agent");

    let outcome = client.submit("hello").await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed(
            "Could not connect to the agent service. Check that it is running and try again."
                .to_string()
        )
    );
    let snapshot = client.snapshot().await;
    assert_eq!(snapshot.turns.len(), 1);
    assert!(snapshot.thread_id.is_none());
}
