//! Error types for pkgtrail-pkg

use pkgtrail_exec::ExecError;
use thiserror::Error;

/// Errors that can stop a collector from producing records
///
/// These never leave [`Collector::collect`](crate::traits::Collector::collect);
/// they exist so each failure is logged with its cause.
#[derive(Error, Debug, Clone)]
pub enum CollectError {
    /// Command could not be started or awaited
    #[error("execution error: {0}")]
    ExecutionError(String),

    /// Command exited non-zero (includes a missing tool, status 127)
    #[error("command failed: {status} - {message}")]
    CommandFailed {
        /// Exit status
        status: i32,
        /// Error message
        message: String,
    },

    /// Failed to parse command output
    #[error("parse error: {0}")]
    ParseError(String),

    /// A tabular listing is missing an expected column header
    #[error("missing column header: {0}")]
    MissingHeader(String),
}

impl CollectError {
    /// Whether the failure means the underlying tool is not installed
    #[must_use]
    pub fn is_missing_tool(&self) -> bool {
        matches!(self, CollectError::CommandFailed { status: 127, .. })
    }
}

impl From<ExecError> for CollectError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::CommandFailed { status, stderr } => CollectError::CommandFailed {
                status,
                message: stderr.trim().to_string(),
            },
            other => CollectError::ExecutionError(other.to_string()),
        }
    }
}
