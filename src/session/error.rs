//! Error types for the session client

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the agent service
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Non-success HTTP status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Streaming error (transport dropped, or the service reported an error event)
    #[error("Streaming error: {0}")]
    Streaming(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Timeout
    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout
        } else if err.is_connect() {
            ServiceError::Network(format!("Connection error: {}", err))
        } else {
            ServiceError::Network(err.to_string())
        }
    }
}

/// Errors surfaced by a submission
#[derive(Debug, Error)]
pub enum SessionError {
    /// The agent service could not create a thread
    #[error("Thread creation failed: {0}")]
    ThreadCreation(#[source] ServiceError),

    /// The run stream failed mid-flight
    #[error("Stream failed: {0}")]
    Stream(#[source] ServiceError),

    /// No event arrived within the idle window
    #[error("No stream event received for {0:?}")]
    IdleTimeout(Duration),

    /// The session was reset while the operation was in flight
    #[error("Operation was cancelled by a session reset")]
    Cancelled,
}

impl SessionError {
    /// Human-readable message for the error banner.
    ///
    /// Never includes the underlying transport error; that goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            SessionError::ThreadCreation(ServiceError::Authentication(_))
            | SessionError::ThreadCreation(ServiceError::Api { status: 401 | 403, .. })
            | SessionError::Stream(ServiceError::Authentication(_))
            | SessionError::Stream(ServiceError::Api { status: 401 | 403, .. }) => {
                "The agent service rejected the request. Check your API key.".to_string()
            }
            SessionError::ThreadCreation(_) => {
                "Could not connect to the agent service. Check that it is running and try again."
                    .to_string()
            }
            SessionError::Stream(_) => {
                "The response was interrupted. Please try again.".to_string()
            }
            SessionError::IdleTimeout(limit) => format!(
                "The agent stopped responding (no output for {:?}). Please try again.",
                limit
            ),
            SessionError::Cancelled => "The conversation was reset.".to_string(),
        }
    }
}

/// Result type alias for agent service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;
