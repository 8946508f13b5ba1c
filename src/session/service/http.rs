//! LangGraph HTTP agent service with SSE streaming

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Value};
use std::env;
use std::time::Duration;

use super::{AgentService, RunRequest, RunStream, RunStreamSender, SseDecoder, SseFrame, STREAM_MODE_MESSAGES};
use crate::config::ServiceSettings;
use crate::session::domain::ThreadId;
use crate::session::error::{ServiceError, ServiceResult};
use crate::session::wire::{self, RunEvent};

/// Header carrying the deployment API key
const API_KEY_HEADER: &str = "x-api-key";

/// Agent service reached over HTTP
pub struct HttpAgentService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpAgentService {
    /// Create a new service client from configuration
    pub fn new(settings: &ServiceSettings) -> ServiceResult<Self> {
        let api_key = match &settings.api_key_env {
            Some(env_var) => Some(env::var(env_var).map_err(|_| {
                ServiceError::Authentication(format!("Environment variable {} not set", env_var))
            })?),
            None => None,
        };

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.connect_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Use an explicit API key instead of the environment
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header(CONTENT_TYPE, "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        builder
    }

    /// Build the request body for a streaming run
    fn build_run_body(request: &RunRequest) -> Value {
        json!({
            "assistant_id": request.assistant_id,
            "input": { "messages": request.messages },
            "stream_mode": STREAM_MODE_MESSAGES,
        })
    }

    async fn check_status(response: reqwest::Response) -> ServiceResult<reqwest::Response> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ServiceError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }
        Ok(response)
    }

    async fn stream_events(request: reqwest::RequestBuilder, sender: RunStreamSender) -> ServiceResult<()> {
        let response = request.header(ACCEPT, "text/event-stream").send().await?;
        let response = Self::check_status(response).await?;

        let mut stream = response.bytes_stream();
        let mut decoder = SseDecoder::new();

        loop {
            // Drop the connection as soon as the client stops listening
            let next = tokio::select! {
                next = stream.next() => next,
                _ = sender.closed() => {
                    tracing::debug!("Run stream closed by the client");
                    return Ok(());
                }
            };
            let Some(chunk_result) = next else {
                break;
            };
            let chunk = chunk_result.map_err(|e| ServiceError::Streaming(e.to_string()))?;

            for frame in decoder.push(&chunk) {
                if !Self::forward(&sender, &frame).await {
                    return Ok(());
                }
            }
        }

        if let Some(frame) = decoder.finish() {
            Self::forward(&sender, &frame).await;
        }

        Ok(())
    }

    /// Normalise and forward one frame; false once the receiver is gone
    async fn forward(sender: &RunStreamSender, frame: &SseFrame) -> bool {
        let event = wire::parse_event(&frame.event, &frame.data);
        if let RunEvent::Ignored(kind) = &event {
            tracing::trace!(event = %kind, "Skipping stream event");
        }
        sender.send(event).await.is_ok()
    }
}

#[derive(Debug, Deserialize)]
struct ThreadResponse {
    thread_id: String,
}

#[async_trait]
impl AgentService for HttpAgentService {
    async fn create_thread(&self) -> ServiceResult<ThreadId> {
        let response = self.post("/threads").json(&json!({})).send().await?;
        let response = Self::check_status(response).await?;

        let thread: ThreadResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Parse(format!("Failed to parse thread response: {}", e)))?;

        Ok(ThreadId::new(thread.thread_id))
    }

    fn stream_run(&self, request: RunRequest) -> RunStream {
        let (sender, stream) = RunStream::channel(64);

        let path = format!("/threads/{}/runs/stream", request.thread_id.as_str());
        let http_request = self.post(&path).json(&Self::build_run_body(&request));

        tokio::spawn(async move {
            let result = Self::stream_events(http_request, sender.clone()).await;
            if let Err(e) = result {
                if !sender.is_closed() {
                    let _ = sender.send_error(e).await;
                }
            }
        });

        stream
    }
}
