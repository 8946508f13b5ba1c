//! Domain types for the session client
//!
//! Turns, tool calls and the transcript that the rendering layer draws.

mod tool_call;
mod turn;

pub use tool_call::*;
pub use turn::*;

use serde::{Deserialize, Serialize};

/// Identifier of a conversation thread on the agent service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render-ready view of the session, published after every mutation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    /// Transcript in order
    pub turns: Vec<Turn>,
    /// Whether a submission is in flight
    pub busy: bool,
    /// Current thread, if one has been created
    pub thread_id: Option<ThreadId>,
    /// Error banner from the last failed submission
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    /// The assistant turn currently being streamed, if any
    pub fn streaming_turn(&self) -> Option<&Turn> {
        if !self.busy {
            return None;
        }
        self.turns.last().filter(|t| t.role == Role::Assistant)
    }
}
