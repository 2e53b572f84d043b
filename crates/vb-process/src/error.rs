//! Error types for process execution.

use std::time::Duration;

/// Error type for process execution.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to spawn command: {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command timed out after {}s: {command}", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new spawn error.
    pub fn spawn<S: Into<String>>(command: S, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(command: S, timeout: Duration) -> Self {
        Self::Timeout {
            command: command.into(),
            timeout,
        }
    }
}
