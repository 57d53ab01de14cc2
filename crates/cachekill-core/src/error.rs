//! Error types and exit code mapping for cachekill.
//!
//! Every failure in a run is reported as a [`CachekillError`]. Nothing is
//! retried or rolled back: file operations completed before the failure stay
//! in place and the error propagates to the caller.
//!
//! ## Exit Codes
//!
//! - `2`: Invalid arguments (bad `length`, malformed `pattern`)
//! - `3`: Resolution errors (bad glob, missing literal source, empty required match)
//! - `4`: I/O errors (read, copy, rename or write failed)
//! - `10`: Internal errors (unexpected state)

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable error codes, used as process exit codes and in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad length, bad pattern).
    InvalidArguments = 2,
    /// A source or target pattern could not be expanded.
    ResolutionError = 3,
    /// A filesystem operation failed.
    IoError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// File Operations
// ============================================================================

/// The filesystem operation that failed, carried by [`CachekillError::Io`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOp {
    Read,
    Copy,
    Rename,
    Write,
}

impl fmt::Display for IoOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoOp::Read => write!(f, "read"),
            IoOp::Copy => write!(f, "copy"),
            IoOp::Rename => write!(f, "rename"),
            IoOp::Write => write!(f, "write"),
        }
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the library and the CLI.
#[derive(Debug, Error)]
pub enum CachekillError {
    /// Invalid configuration (length out of range, pattern missing placeholders).
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// A pattern could not be expanded into file paths.
    #[error("cannot resolve '{pattern}': {message}")]
    Resolution { pattern: String, message: String },

    /// A filesystem operation failed.
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A resolved path cannot be fingerprinted.
    #[error("invalid path {}: {reason}", .path.display())]
    InvalidPath { path: PathBuf, reason: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CachekillError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        CachekillError::Config {
            message: message.into(),
        }
    }

    /// Create a resolution error for `pattern`.
    pub fn resolution(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        CachekillError::Resolution {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O error with the operation and path it came from.
    pub fn io(op: IoOp, path: impl AsRef<Path>, source: io::Error) -> Self {
        CachekillError::Io {
            op,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        CachekillError::Internal {
            message: message.into(),
        }
    }

    /// The file path this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            CachekillError::Io { path, .. } | CachekillError::InvalidPath { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }
}

impl From<&CachekillError> for OutputErrorCode {
    fn from(err: &CachekillError) -> Self {
        match err {
            CachekillError::Config { .. } => OutputErrorCode::InvalidArguments,
            CachekillError::Resolution { .. } => OutputErrorCode::ResolutionError,
            CachekillError::InvalidPath { .. } => OutputErrorCode::ResolutionError,
            CachekillError::Io { .. } => OutputErrorCode::IoError,
            CachekillError::Internal { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<CachekillError> for OutputErrorCode {
    fn from(err: CachekillError) -> Self {
        OutputErrorCode::from(&err)
    }
}

/// Result alias used throughout cachekill-core.
pub type CachekillResult<T> = Result<T, CachekillError>;

// ============================================================================
// Tests
// ============================================================================
