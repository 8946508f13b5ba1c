//! Tool call records surfaced during an assistant turn

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status of a tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolCallStatus {
    /// Announced but not started
    #[default]
    Pending,
    /// Running on the agent side
    Running,
    /// Finished
    Completed,
    /// Failed on the agent side
    Error,
}

impl std::fmt::Display for ToolCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolCallStatus::Pending => write!(f, "pending"),
            ToolCallStatus::Running => write!(f, "running"),
            ToolCallStatus::Completed => write!(f, "completed"),
            ToolCallStatus::Error => write!(f, "error"),
        }
    }
}

/// A tool invocation made by the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier assigned by the agent service
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Arguments passed to the tool (as JSON)
    pub args: Value,
    /// Current status
    pub status: ToolCallStatus,
}

impl ToolCall {
    /// Create a tool call in the `running` state
    pub fn running(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            args,
            status: ToolCallStatus::Running,
        }
    }

    /// Mark the call as completed
    pub fn complete(&mut self) {
        self.status = ToolCallStatus::Completed;
    }
}
