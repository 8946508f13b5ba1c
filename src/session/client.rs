//! Session stream client
//!
//! Owns the transcript, the current thread and the busy flag. All three
//! live in one [`SessionState`] value that is only mutated from
//! [`SessionClient::submit`] and [`SessionClient::reset`]; every mutation
//! publishes a fresh [`SessionSnapshot`] on a watch channel.
//!
//! A reset bumps the session epoch and closes the in-flight stream.
//! Work started under an older epoch never touches the state again.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::AbortHandle;
use futures::StreamExt;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::{debug, info, warn};

use super::assembler::TurnAssembler;
use super::domain::{SessionSnapshot, ThreadId, Transcript, Turn};
use super::error::{ServiceError, SessionError, SessionResult};
use super::service::{AgentService, RunRequest, RunStream};
use super::wire::RunEvent;
use crate::config::ServiceSettings;

/// What happened to a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty text, or another submission was in flight
    Ignored,
    /// The assistant turn was streamed to the end
    Completed,
    /// The submission failed; carries the banner text
    Failed(String),
    /// A reset happened while the submission was in flight
    Discarded,
}

/// Phase of one in-flight run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunPhase {
    Opening,
    Streaming,
    Finalized,
}

#[derive(Debug, Default)]
struct SessionState {
    transcript: Transcript,
    thread_id: Option<ThreadId>,
    busy: bool,
    epoch: u64,
    active_run: Option<AbortHandle>,
    last_error: Option<String>,
}

impl SessionState {
    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            turns: self.transcript.turns().to_vec(),
            busy: self.busy,
            thread_id: self.thread_id.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Client for one chat session against the agent service
#[derive(Clone)]
pub struct SessionClient {
    service: Arc<dyn AgentService>,
    assistant_id: String,
    idle_timeout: Option<Duration>,
    state: Arc<RwLock<SessionState>>,
    updates: Arc<watch::Sender<SessionSnapshot>>,
    errors: broadcast::Sender<String>,
}

impl SessionClient {
    /// Create a new session client
    pub fn new(service: Arc<dyn AgentService>, assistant_id: impl Into<String>) -> Self {
        let (updates, _) = watch::channel(SessionSnapshot::default());
        let (errors, _) = broadcast::channel(16);

        Self {
            service,
            assistant_id: assistant_id.into(),
            idle_timeout: None,
            state: Arc::new(RwLock::new(SessionState::default())),
            updates: Arc::new(updates),
            errors,
        }
    }

    /// Create a session client from service configuration
    pub fn from_settings(service: Arc<dyn AgentService>, settings: &ServiceSettings) -> Self {
        Self::new(service, settings.assistant_id.clone()).with_idle_timeout(settings.idle_timeout())
    }

    /// Fail a run when no event arrives within `timeout`
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Watch the render-ready session state
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    /// Receive user-facing error messages
    pub fn subscribe_errors(&self) -> broadcast::Receiver<String> {
        self.errors.subscribe()
    }

    /// Current session state
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    /// Whether a submission is in flight
    pub async fn is_busy(&self) -> bool {
        self.state.read().await.busy
    }

    /// The current thread, if one exists
    pub async fn thread_id(&self) -> Option<ThreadId> {
        self.state.read().await.thread_id.clone()
    }

    /// Return the current thread, creating one if needed
    pub async fn ensure_thread(&self) -> SessionResult<ThreadId> {
        let epoch = self.state.read().await.epoch;
        self.resolve_thread(epoch).await
    }

    /// Submit a user turn and stream the assistant's reply into the transcript
    pub async fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Ignored;
        }

        let epoch = {
            let mut state = self.state.write().await;
            if state.busy {
                debug!("Submission ignored while another is in flight");
                return SubmitOutcome::Ignored;
            }
            state.busy = true;
            state.last_error = None;
            state.transcript.push(Turn::user(text));
            self.publish(&state);
            state.epoch
        };

        let thread_id = match self.resolve_thread(epoch).await {
            Ok(id) => id,
            Err(SessionError::Cancelled) => return SubmitOutcome::Discarded,
            Err(e) => return self.fail(epoch, None, e).await,
        };

        let turn_id = {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                return SubmitOutcome::Discarded;
            }
            let id = state.transcript.push(Turn::assistant_placeholder());
            self.publish(&state);
            id
        };

        let request = RunRequest::user_turn(thread_id.clone(), self.assistant_id.clone(), text);
        let mut stream = self.service.stream_run(request);

        {
            let mut state = self.state.write().await;
            if state.epoch != epoch {
                stream.close();
                return SubmitOutcome::Discarded;
            }
            state.active_run = Some(stream.abort_handle());
        }

        info!(thread_id = %thread_id, "Run started");

        match self.consume(epoch, &turn_id, &mut stream).await {
            Ok(true) => self.finish(epoch).await,
            Ok(false) => SubmitOutcome::Discarded,
            Err(e) => self.fail(epoch, Some(&turn_id), e).await,
        }
    }

    /// Clear the transcript and forget the thread
    ///
    /// Output of a run that is still streaming is discarded.
    pub async fn reset(&self) {
        let mut state = self.state.write().await;
        state.epoch += 1;
        state.transcript.clear();
        state.thread_id = None;
        state.busy = false;
        state.last_error = None;
        if let Some(run) = state.active_run.take() {
            run.abort();
            info!("Closed in-flight run on reset");
        }
        self.publish(&state);
    }

    async fn resolve_thread(&self, epoch: u64) -> SessionResult<ThreadId> {
        if let Some(id) = self.state.read().await.thread_id.clone() {
            return Ok(id);
        }

        let created = self
            .service
            .create_thread()
            .await
            .map_err(SessionError::ThreadCreation)?;

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            debug!(thread_id = %created, "Dropping thread created before reset");
            return Err(SessionError::Cancelled);
        }
        // Another caller may have won the race
        if let Some(existing) = &state.thread_id {
            return Ok(existing.clone());
        }
        info!(thread_id = %created, "Created thread");
        state.thread_id = Some(created.clone());
        self.publish(&state);
        Ok(created)
    }

    /// Drive the stream; Ok(false) means the run was discarded by a reset
    async fn consume(&self, epoch: u64, turn_id: &str, stream: &mut RunStream) -> SessionResult<bool> {
        let mut assembler = TurnAssembler::new();
        let mut phase = RunPhase::Opening;

        loop {
            let next = match self.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, stream.next()).await {
                    Ok(next) => next,
                    // A finished message stays; only the open transport is dropped
                    Err(_) if phase == RunPhase::Finalized => {
                        debug!("Closing idle stream after complete message");
                        stream.close();
                        return Ok(self.state.read().await.epoch == epoch);
                    }
                    Err(_) => return Err(SessionError::IdleTimeout(limit)),
                },
                None => stream.next().await,
            };

            let Some(item) = next else {
                break;
            };
            let event = item.map_err(SessionError::Stream)?;

            match event {
                RunEvent::Partial(snapshot) => {
                    if phase == RunPhase::Opening {
                        phase = RunPhase::Streaming;
                    }
                    assembler.apply(&snapshot);
                    if !self.write_turn(epoch, turn_id, &assembler).await {
                        return Ok(false);
                    }
                }
                RunEvent::Complete => {
                    assembler.complete();
                    if !self.write_turn(epoch, turn_id, &assembler).await {
                        return Ok(false);
                    }
                    phase = RunPhase::Finalized;
                    debug!(tool_calls = assembler.tool_calls().len(), "Assistant message complete");
                }
                RunEvent::Error(message) => {
                    return Err(SessionError::Stream(ServiceError::Streaming(message)));
                }
                RunEvent::Ignored(kind) => {
                    debug!(event = %kind, "Ignoring stream event");
                }
            }
        }

        if stream.is_closed() || self.state.read().await.epoch != epoch {
            return Ok(false);
        }
        if phase != RunPhase::Finalized {
            debug!(?phase, "Stream ended without a complete event");
        }
        Ok(true)
    }

    /// Copy the assembler state onto the placeholder; false if superseded
    async fn write_turn(&self, epoch: u64, turn_id: &str, assembler: &TurnAssembler) -> bool {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            return false;
        }
        match state.transcript.get_mut(turn_id) {
            Some(turn) => assembler.write_to(turn),
            None => return false,
        }
        self.publish(&state);
        true
    }

    async fn finish(&self, epoch: u64) -> SubmitOutcome {
        let mut state = self.state.write().await;
        if state.epoch != epoch {
            return SubmitOutcome::Discarded;
        }
        state.busy = false;
        state.active_run = None;
        self.publish(&state);
        info!("Run completed");
        SubmitOutcome::Completed
    }

    async fn fail(&self, epoch: u64, placeholder: Option<&str>, error: SessionError) -> SubmitOutcome {
        warn!("Submission failed: {}", error);

        let mut state = self.state.write().await;
        if state.epoch != epoch {
            return SubmitOutcome::Discarded;
        }
        if let Some(id) = placeholder {
            state.transcript.remove(id);
        }
        let message = error.user_message();
        state.busy = false;
        state.active_run = None;
        state.last_error = Some(message.clone());
        self.publish(&state);

        let _ = self.errors.send(message.clone());
        SubmitOutcome::Failed(message)
    }

    fn publish(&self, state: &SessionState) {
        self.updates.send_replace(state.snapshot());
    }
}
