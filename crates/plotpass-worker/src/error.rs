//! Error types for the worker adapter
//!
//! Every failure crossing the worker boundary is returned to the caller
//! as a value.

use thiserror::Error;

/// Worker render error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkerError {
    /// The worker did not answer within the client timeout
    #[error("Render timed out after {timeout_ms} ms")]
    Timeout {
        /// The timeout that expired.
        timeout_ms: u64,
    },

    /// The abort signal was raised before dispatch
    #[error("Render aborted before dispatch")]
    Aborted,

    /// A frame could not be encoded or decoded
    #[error("Worker transport error: {reason}")]
    Transport {
        /// Why the frame was rejected.
        reason: String,
    },

    /// The worker was restarted while the request was outstanding
    #[error("Worker terminated: {reason}")]
    Terminated {
        /// Why the worker was restarted.
        reason: String,
    },

    /// The worker reported a structured error for the request
    #[error("Worker error: {message}")]
    Remote {
        /// Error message from the worker.
        message: String,
    },

    /// The client supervisor is gone
    #[error("Worker client is closed")]
    Closed,
}

impl WorkerError {
    /// Whether the failure caused (or came from) a worker restart
    pub fn is_restart(&self) -> bool {
        matches!(
            self,
            WorkerError::Timeout { .. }
                | WorkerError::Aborted
                | WorkerError::Transport { .. }
                | WorkerError::Terminated { .. }
        )
    }
}

impl From<serde_json::Error> for WorkerError {
    fn from(err: serde_json::Error) -> Self {
        WorkerError::Transport {
            reason: err.to_string(),
        }
    }
}

/// Result type for worker operations
pub type Result<T> = std::result::Result<T, WorkerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            WorkerError::Timeout { timeout_ms: 250 }.to_string(),
            "Render timed out after 250 ms"
        );
        assert_eq!(
            WorkerError::Remote {
                message: "boom".into()
            }
            .to_string(),
            "Worker error: boom"
        );
    }

    #[test]
    fn test_json_error_is_transport() {
        let err: WorkerError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, WorkerError::Transport { .. }));
        assert!(err.is_restart());
        assert!(!WorkerError::Closed.is_restart());
    }
}
