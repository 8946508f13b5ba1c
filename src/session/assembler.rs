//! Rebuilds an assistant turn from cumulative partial events

use std::collections::HashSet;

use super::domain::{ToolCall, Turn};
use super::wire::AssistantSnapshot;

/// Accumulator for one assistant turn
///
/// Partial events carry the full state so far, so text is replaced on
/// every update. Tool calls are keyed by id: the first block seen for an
/// id creates the record and later blocks for the same id are ignored.
#[derive(Debug, Default)]
pub struct TurnAssembler {
    content: String,
    tool_calls: Vec<ToolCall>,
    seen: HashSet<String>,
}

impl TurnAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a partial snapshot
    pub fn apply(&mut self, snapshot: &AssistantSnapshot) {
        self.content.clone_from(&snapshot.text);

        for tool_use in &snapshot.tool_uses {
            if self.seen.insert(tool_use.id.clone()) {
                self.tool_calls.push(ToolCall::running(
                    &tool_use.id,
                    &tool_use.name,
                    tool_use.input.clone(),
                ));
            }
        }
    }

    /// Mark every recorded tool call completed
    pub fn complete(&mut self) {
        for call in &mut self.tool_calls {
            call.complete();
        }
    }

    /// Copy the recomputed state onto the turn
    pub fn write_to(&self, turn: &mut Turn) {
        turn.content.clone_from(&self.content);
        turn.tool_calls.clone_from(&self.tool_calls);
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        &self.tool_calls
    }
}
