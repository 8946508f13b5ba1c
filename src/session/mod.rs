//! Streaming chat-session client
//!
//! This module turns user prompts into an incrementally updated
//! transcript backed by one conversation thread on a remote agent
//! service.
//!
//! ## Architecture
//!
//! - `domain/` - Turn, ToolCall, Transcript and the published snapshot
//! - `wire` - normalisation of raw stream events
//! - `assembler` - rebuilds an assistant turn from cumulative events
//! - `service/` - the agent service port, its HTTP implementation and the
//!   cancellable run stream
//! - `client` - session state container and the run state machine

pub mod assembler;
pub mod client;
pub mod domain;
pub mod error;
pub mod service;
pub mod wire;

pub use client::{SessionClient, SubmitOutcome};
pub use domain::*;
pub use error::*;
pub use service::{AgentService, HttpAgentService, RunRequest, RunStream, RunStreamSender};
