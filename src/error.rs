//! Error types for the PrepSmart client.

use std::time::Duration;

use crate::crisis::TaskHandle;

/// Top-level error type for the client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Polling error: {0}")]
    Poll(#[from] PollError),

    #[error("Plan result error: {0}")]
    Plan(#[from] ResultError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Any non-2xx response, network failure, or undecodable body.
///
/// `status` is `None` when no HTTP response was received at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub status: Option<u16>,
    pub message: String,
}

impl TransportError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Whether the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

/// Terminal outcomes of a polling session other than completion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError {
    #[error("Task not found. The plan generation may have expired.")]
    TaskNotFound { task_id: String },

    #[error("{message}")]
    JobFailed { message: String },

    #[error("Plan generation timed out after {waited:?}")]
    Timeout { waited: Duration },

    #[error("Polling was cancelled")]
    Cancelled,
}

impl PollError {
    /// Whether the task behind this error is finished for good, so its
    /// handle should no longer be tracked. A cancelled session can resume.
    pub fn ends_task(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

/// Errors fetching the finished plan or its PDF.
#[derive(Debug, thiserror::Error)]
pub enum ResultError {
    #[error("Result for task {task_id} is not ready yet")]
    NotReady { task_id: String },

    #[error("Failed to decode plan result: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unexpected response body: {0}")]
    UnexpectedBody(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Required wizard fields are missing. Blocks the step transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Please fill in all required fields")]
pub struct ValidationError {
    /// Field names that failed the presence check, in step order.
    pub missing: Vec<String>,
}

/// Wizard state machine errors.
#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Wizard has already been submitted")]
    AlreadySubmitted,

    #[error("Submission is only possible from the review step (currently on step {step})")]
    NotOnReviewStep { step: u8 },

    #[error("Submission failed: {0}")]
    Submission(#[from] TransportError),

    /// The backend accepted the job but its handle could not be saved, so it
    /// will not survive a restart.
    #[error("Plan {handle} was submitted but its handle could not be saved: {source}")]
    HandleNotPersisted {
        handle: TaskHandle,
        source: SessionError,
    },
}

/// Session storage errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for the client.
pub type Result<T> = std::result::Result<T, Error>;
