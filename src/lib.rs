//! # pmm-chat - PMM agent chat client
//!
//! A terminal client for the product-marketing evaluation agent hosted on a
//! LangGraph-compatible agent service. Prompts are sent as runs on one
//! conversation thread and the assistant's reply is rendered while it
//! streams, including the tools the agent calls along the way.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pmm_chat::config::Settings;
//! use pmm_chat::session::{HttpAgentService, SessionClient, SubmitOutcome};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::new()?;
//!     let service = Arc::new(HttpAgentService::new(&settings.service)?);
//!     let client = SessionClient::from_settings(service, &settings.service);
//!
//!     let outcome = client.submit("Run a 5-second test on https://example.com").await;
//!     assert_eq!(outcome, SubmitOutcome::Completed);
//!
//!     for turn in client.snapshot().await.turns {
//!         println!("{:?}: {}", turn.role, turn.content);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **session**: transcript, thread lifecycle and the streaming run state machine
//! - **repl**: interactive terminal front end and quick-pick prompts
//! - **config**: layered settings (file, environment, CLI)

pub mod cli;
pub mod config;
pub mod repl;
pub mod session;
