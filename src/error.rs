//! Error types for parconv operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type for parconv operations
pub type Result<T> = std::result::Result<T, ParconvError>;

/// Errors that can occur while partitioning, executing or verifying a run
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParconvError {
    /// Input file missing or unreadable
    #[error("Configuration error ({}): {reason}", .path.display())]
    Config {
        /// Path of the input file
        path: PathBuf,
        /// Why the file could not be used
        reason: String,
    },

    /// Malformed token in the input file
    #[error("Parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong with the token
        message: String,
    },

    /// A worker could not be spawned or did not run to completion
    #[error("Worker {worker} failed: {reason}")]
    WorkerFailure {
        /// Index of the worker within its executor invocation
        worker: usize,
        /// Panic payload or spawn error
        reason: String,
    },

    /// Parallel result differs from the sequential reference
    #[error("Verification mismatch at ({row}, {col}): expected {expected}, got {actual}")]
    VerificationMismatch {
        /// Row of the first mismatching cell
        row: usize,
        /// Column of the first mismatching cell
        col: usize,
        /// Value computed by the sequential reference
        expected: i32,
        /// Value computed by the parallel strategy
        actual: i32,
    },

    /// Size mismatch between operands
    #[error("Size mismatch: expected {expected}, got {actual}")]
    SizeMismatch {
        /// Expected size
        expected: usize,
        /// Actual size
        actual: usize,
    },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ParconvError {
    /// Create a configuration error for `path`
    pub fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
