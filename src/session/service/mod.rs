//! Agent service boundary
//!
//! The remote agent service owns the conversation threads and runs the
//! agent. The client only needs two operations from it, captured by the
//! [`AgentService`] trait; [`HttpAgentService`] implements them over the
//! LangGraph HTTP API.

mod http;
mod sse;
mod stream;

pub use http::HttpAgentService;
pub use sse::{SseDecoder, SseFrame};
pub use stream::{RunStream, RunStreamSender};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::session::domain::{Role, ThreadId};
use crate::session::error::ServiceResult;

/// Port trait for the remote agent service
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Create a new conversation thread
    async fn create_thread(&self) -> ServiceResult<ThreadId>;

    /// Start a run on a thread and stream its events
    fn stream_run(&self, request: RunRequest) -> RunStream;
}

/// Stream mode requested for runs
pub const STREAM_MODE_MESSAGES: &str = "messages";

/// One streaming run against a thread
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub thread_id: ThreadId,
    pub assistant_id: String,
    /// Messages sent as run input (the new user turn)
    pub messages: Vec<InputMessage>,
}

impl RunRequest {
    /// Request carrying a single user message
    pub fn user_turn(
        thread_id: ThreadId,
        assistant_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            thread_id,
            assistant_id: assistant_id.into(),
            messages: vec![InputMessage {
                role: Role::User,
                content: text.into(),
            }],
        }
    }
}

/// Message in a run's input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: String,
}
