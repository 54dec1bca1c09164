//! Error types for transport and dispatch.

use bulk_generator::GeneratorError;
use thiserror::Error;

/// Errors reported by a [`Transport`](crate::Transport).
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP request failed before a response was received.
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The index store answered with a non-success status.
    #[error("Request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from a single build-and-dispatch task.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Record generation failed; fatal to the run.
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    /// Delivery failed after every allowed attempt.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The task panicked or was aborted by the runtime.
    #[error("Dispatch task failed: {0}")]
    TaskFailed(String),

    /// The run was cancelled while the task was in flight.
    #[error("Dispatch cancelled")]
    Cancelled,
}

impl DispatchError {
    /// Whether this error stops the run after the current round.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DispatchError::Generator(_))
    }
}
