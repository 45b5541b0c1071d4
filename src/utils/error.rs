//! Error types for the optimizer wrapper.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use thiserror::Error;

/// Main error type for the wrapper.
///
/// All errors in the crate are converted to this type before being
/// returned to the caller.
#[derive(Error, Debug)]
pub enum OptimizerError {
    /// Input validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external binary failed to spawn or exited unsuccessfully
    #[error("`{program}` failed (exit code {code:?}): {detail}")]
    Exec {
        /// Program that was invoked
        program: String,
        /// Exit code, if the process ran at all
        code: Option<i32>,
        /// Stderr (or stdout when stderr was empty)
        detail: String,
    },

    /// A queued call was dropped before it could report back
    #[error("Queue error: {0}")]
    Queue(String),

    /// File IO error
    #[error("IO error: {0}")]
    Io(String),
}

/// Convenience result type for optimizer operations.
pub type OptimizerResult<T> = Result<T, OptimizerError>;

// Helper methods for error creation
impl OptimizerError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    pub fn exec<P: Into<String>, T: Into<String>>(program: P, code: Option<i32>, detail: T) -> Self {
        Self::Exec {
            program: program.into(),
            code,
            detail: detail.into(),
        }
    }

    pub fn queue<T: Into<String>>(msg: T) -> Self {
        Self::Queue(msg.into())
    }

    pub fn io<T: Into<String>>(msg: T) -> Self {
        Self::Io(msg.into())
    }
}

// Convert std::io::Error to OptimizerError
impl From<io::Error> for OptimizerError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
