//! Input Capability Error Types
//!
//! Errors raised at the boundary with the OS: mouse sinks and the screen
//! geometry provider.

use thiserror::Error;

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;

/// Input module error types
#[derive(Error, Debug)]
pub enum InputError {
    /// Helper binary missing or not executable
    #[error("Command unavailable: {command}: {reason}")]
    CommandUnavailable {
        /// Binary name
        command: String,
        /// Spawn failure description
        reason: String,
    },

    /// Helper binary ran but reported failure
    #[error("Command failed: {command} ({status})")]
    CommandFailed {
        /// Command line that failed
        command: String,
        /// Exit status description
        status: String,
    },

    /// Screen resolution could not be determined
    #[error("Screen resolution unavailable: {0}")]
    ScreenUnavailable(String),

    /// Malformed helper output
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// Sink command queue is full
    #[error("Mouse command queue is full")]
    QueueFull,

    /// Sink worker has stopped
    #[error("Mouse command queue disconnected")]
    QueueDisconnected,

    /// Invalid configuration for an input capability
    #[error("Invalid input configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error classification matching the recovery policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad configuration: skip the affected effect, keep running
    Configuration,
    /// Capability missing: disable cursor control for the process
    ResourceUnavailable,
    /// One-off failure: log and carry on
    Transient,
}

impl InputError {
    /// Classify error for recovery strategy selection
    pub fn kind(&self) -> ErrorKind {
        match self {
            InputError::InvalidConfig(_) => ErrorKind::Configuration,

            InputError::CommandUnavailable { .. }
            | InputError::ScreenUnavailable(_)
            | InputError::ParseError(_)
            | InputError::QueueDisconnected => ErrorKind::ResourceUnavailable,

            InputError::CommandFailed { .. } | InputError::QueueFull | InputError::Io(_) => {
                ErrorKind::Transient
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert_eq!(
            InputError::ScreenUnavailable("no display".into()).kind(),
            ErrorKind::ResourceUnavailable
        );
        assert_eq!(
            InputError::CommandUnavailable {
                command: "xdotool".into(),
                reason: "not found".into()
            }
            .kind(),
            ErrorKind::ResourceUnavailable
        );
        assert_eq!(InputError::QueueFull.kind(), ErrorKind::Transient);
        assert_eq!(
            InputError::CommandFailed {
                command: "xdotool mousemove 1 1".into(),
                status: "exit status: 1".into()
            }
            .kind(),
            ErrorKind::Transient
        );
        assert_eq!(
            InputError::InvalidConfig("queue_depth = 0".into()).kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_error_display() {
        let err = InputError::CommandFailed {
            command: "xdotool mouseup 1".into(),
            status: "exit status: 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "Command failed: xdotool mouseup 1 (exit status: 1)"
        );
    }
}
