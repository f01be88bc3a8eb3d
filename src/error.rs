//! Error types shared by every IMS operation

use std::io;

use thiserror::Error;

use crate::utils::AtomicError;

/// Result type for IMS operations
pub type ImsResult<T> = Result<T, ImsError>;

/// Errors that abort the current operation
///
/// Conflicts such as a duplicate tag are not errors; they are reported
/// through the outcome types of [`crate::lifecycle`].
#[derive(Error, Debug)]
pub enum ImsError {
    #[error("Unknown package manager ID: {0}")]
    UnknownManager(String),

    #[error("Unknown command id {operation} for package manager ID: {manager}")]
    UnknownOperation { manager: String, operation: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("`{command}` failed with {}", describe_status(.status))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("Failed to launch `{program}`: {source}")]
    CommandLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Atomic(#[from] AtomicError),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("error code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl ImsError {
    /// Captured output of a failed external command, if any
    pub fn captured_output(&self) -> Option<(&str, &str)> {
        match self {
            ImsError::CommandFailed { stdout, stderr, .. } => Some((stdout, stderr)),
            _ => None,
        }
    }
}
