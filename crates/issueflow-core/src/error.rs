//! Error taxonomy for the issueflow pipeline.

use thiserror::Error;

/// Errors surfaced by pipeline stages and their collaborators.
///
/// Malformed fenced blocks in model output are not represented here: the
/// parser drops them instead of failing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The work item does not exist in the tracker.
    #[error("work item not found: #{identifier}")]
    NotFound { identifier: u64 },

    /// Any failure talking to a remote service.
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport { status: Option<u16>, message: String },

    /// The submission branch already exists.
    #[error("branch already exists: {branch}")]
    Conflict { branch: String },

    /// Missing or invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// Transport error without an HTTP status (connection refused, DNS, decode...).
    pub fn transport(message: impl Into<String>) -> Self {
        PipelineError::Transport {
            status: None,
            message: message.into(),
        }
    }
}

/// Error returned by a generative text backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("backend error{}: {message}", status_suffix(.status))]
pub struct BackendError {
    /// HTTP-like status, absent when the request never got a response.
    pub status: Option<u16>,
    pub message: String,
}

impl BackendError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Whether this is the "account balance too low" rejection.
    ///
    /// Only a 400 whose message mentions the credit balance qualifies.
    pub fn is_low_balance(&self) -> bool {
        self.status == Some(400) && self.message.contains("credit balance")
    }
}

impl From<BackendError> for PipelineError {
    fn from(err: BackendError) -> Self {
        PipelineError::Transport {
            status: err.status,
            message: err.message,
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::transport(format!("malformed response payload: {err}"))
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
