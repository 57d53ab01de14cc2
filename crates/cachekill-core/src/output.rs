//! Run results and their JSON envelopes.
//!
//! [`FingerprintReport`] is the programmatic result of a run. The response
//! types wrap it (or an error) for machine-readable CLI output:
//!
//! 1. **Status first:** every response starts with `status` (`ok` or `error`)
//! 2. **Versioned:** `schema_version` lets consumers detect format changes
//! 3. **Nullable vs absent:** `targetPaths` is `null` when no targets were resolved
//!
//! Envelope fields are snake_case; the flattened report keeps its camelCase
//! `sourcePaths`, `targetPaths` and `newPath`.

use std::io::{self, Write};
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{CachekillError, OutputErrorCode};
use crate::naming::SourceEntry;
use crate::options::Mode;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

/// Where a source was and where its fingerprinted file is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePath {
    pub path: PathBuf,
    pub new_path: PathBuf,
}

impl From<&SourceEntry> for SourcePath {
    fn from(entry: &SourceEntry) -> Self {
        SourcePath {
            path: entry.original_path.clone(),
            new_path: entry.new_path.clone(),
        }
    }
}

/// Result of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintReport {
    /// Processed sources, in processing order.
    pub source_paths: Vec<SourcePath>,
    /// Target files that were rewritten, or `None` if none were resolved.
    pub target_paths: Option<Vec<PathBuf>>,
    /// Total number of references replaced across all targets.
    pub replacements: usize,
}

impl FingerprintReport {
    /// Number of target files processed.
    pub fn target_count(&self) -> usize {
        self.target_paths.as_ref().map_or(0, Vec::len)
    }
}

/// Success envelope for a run.
#[derive(Debug, Clone, Serialize)]
pub struct FingerprintResponse {
    pub status: String,
    pub schema_version: String,
    pub mode: Mode,
    pub dry_run: bool,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub report: FingerprintReport,
}

impl FingerprintResponse {
    pub fn new(report: FingerprintReport, mode: Mode, dry_run: bool, elapsed_ms: u64) -> Self {
        FingerprintResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            mode,
            dry_run,
            elapsed_ms,
            report,
        }
    }
}

/// Error details in an error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code, also the process exit code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a CachekillError.
    pub fn from_error(err: &CachekillError) -> Self {
        let mut details = serde_json::Map::new();
        match err {
            CachekillError::Resolution { pattern, .. } => {
                details.insert("pattern".to_string(), pattern.clone().into());
            }
            CachekillError::Io { op, .. } => {
                details.insert("op".to_string(), op.to_string().into());
            }
            _ => {}
        }
        if let Some(path) = err.path() {
            details.insert("path".to_string(), path.display().to_string().into());
        }
        let details = (!details.is_empty()).then_some(serde_json::Value::Object(details));
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
            details,
        }
    }
}

/// Error envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &CachekillError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON followed by a newline.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}
