//! Wire format of the run event stream
//!
//! Every frame coming off the transport is normalised here into a
//! [`RunEvent`] before the client looks at it. Unknown event kinds,
//! unknown block types and blocks with missing fields are dropped at this
//! boundary instead of failing the stream.

use serde::Deserialize;
use serde_json::Value;

/// Event name carrying the cumulative state of the in-progress message
pub const EVENT_PARTIAL: &str = "messages/partial";
/// Event name closing one assistant message
pub const EVENT_COMPLETE: &str = "messages/complete";
/// Event name the service uses to report a failed run
pub const EVENT_ERROR: &str = "error";

/// Normalised stream event
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Full current state of the assistant message
    Partial(AssistantSnapshot),
    /// The assistant message finished generating
    Complete,
    /// The service reported an error for this run
    Error(String),
    /// Anything else; carries the event name for logging
    Ignored(String),
}

/// Current assistant state extracted from a partial event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantSnapshot {
    /// Text so far (replaces, never appends)
    pub text: String,
    /// Tool invocation blocks, in block order
    pub tool_uses: Vec<ToolUse>,
}

/// A tool invocation block
#[derive(Debug, Clone, PartialEq)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: Value,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Normalise one raw `(event, data)` pair
pub fn parse_event(event: &str, data: &str) -> RunEvent {
    match event {
        EVENT_PARTIAL => match parse_messages(data) {
            Some(snapshot) => RunEvent::Partial(snapshot),
            None => {
                tracing::warn!("Ignoring unreadable {} payload", EVENT_PARTIAL);
                RunEvent::Ignored(event.to_string())
            }
        },
        EVENT_COMPLETE => RunEvent::Complete,
        EVENT_ERROR => RunEvent::Error(parse_error(data)),
        other => RunEvent::Ignored(other.to_string()),
    }
}

/// Take the last message of a `Message[]` payload as the assistant state
fn parse_messages(data: &str) -> Option<AssistantSnapshot> {
    let messages: Vec<WireMessage> = serde_json::from_str(data).ok()?;
    let content = messages.into_iter().last()?.content?;
    snapshot_from_content(&content)
}

/// Build a snapshot from message content (flat string or block array)
pub fn snapshot_from_content(content: &Value) -> Option<AssistantSnapshot> {
    match content {
        Value::String(text) => Some(AssistantSnapshot {
            text: text.clone(),
            tool_uses: Vec::new(),
        }),
        Value::Array(blocks) => {
            let mut snapshot = AssistantSnapshot::default();
            for block in blocks {
                match block.get("type").and_then(Value::as_str) {
                    Some("text") => {
                        if let Some(text) = block.get("text").and_then(Value::as_str) {
                            snapshot.text.push_str(text);
                        }
                    }
                    Some("tool_use") | Some("tool_call") => {
                        if let Some(tool_use) = parse_tool_use(block) {
                            snapshot.tool_uses.push(tool_use);
                        }
                    }
                    _ => {}
                }
            }
            Some(snapshot)
        }
        _ => None,
    }
}

fn parse_tool_use(block: &Value) -> Option<ToolUse> {
    let id = block.get("id").and_then(Value::as_str)?;
    let name = block.get("name").and_then(Value::as_str)?;
    let input = block.get("input").or_else(|| block.get("args"))?;
    if id.is_empty() || name.is_empty() {
        return None;
    }
    Some(ToolUse {
        id: id.to_string(),
        name: name.to_string(),
        input: input.clone(),
    })
}

fn parse_error(data: &str) -> String {
    match serde_json::from_str::<WireError>(data) {
        Ok(WireError { message: Some(m), .. }) => m,
        Ok(WireError { error: Some(e), .. }) => e,
        _ if !data.trim().is_empty() => data.trim().to_string(),
        _ => "unknown error".to_string(),
    }
}
