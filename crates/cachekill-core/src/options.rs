//! Run configuration: what to fingerprint, how to name it, and how to apply it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CachekillError, CachekillResult};

/// Longest fingerprint that can be requested, in hex characters.
pub const MAX_HASH_LENGTH: usize = 32;

/// Default fingerprint length.
pub const DEFAULT_HASH_LENGTH: usize = MAX_HASH_LENGTH;

/// Default template for fingerprinted file names.
pub const DEFAULT_PATTERN: &str = "{name}-{hash}{ext}";

const PLACEHOLDERS: [&str; 3] = ["{name}", "{hash}", "{ext}"];

// ============================================================================
// Mode
// ============================================================================

/// What happens to the original source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Leave the original in place and write a fingerprinted copy next to it.
    #[default]
    Copy,
    /// Move the original to its fingerprinted name.
    Rename,
}

impl Mode {
    /// Past-tense verb used when reporting an operation.
    pub fn verb(&self) -> &'static str {
        match self {
            Mode::Copy => "copied",
            Mode::Rename => "renamed",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Copy => write!(f, "copy"),
            Mode::Rename => write!(f, "rename"),
        }
    }
}

/// How old base names are matched inside target files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Any occurrence of the base name, even inside a longer token.
    #[default]
    Substring,
    /// Only occurrences not flanked by file name characters.
    Boundary,
}

// ============================================================================
// Name Pattern
// ============================================================================

/// Template for fingerprinted file names, e.g. `{name}-{hash}{ext}`.
///
/// Each placeholder must appear, and only its first occurrence is substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern(String);

impl NamePattern {
    /// Parse and validate a template.
    pub fn new(template: impl Into<String>) -> CachekillResult<Self> {
        let template = template.into();
        let missing: Vec<&str> = PLACEHOLDERS
            .iter()
            .copied()
            .filter(|p| !template.contains(p))
            .collect();
        if !missing.is_empty() {
            return Err(CachekillError::config(format!(
                "pattern '{}' is missing {}",
                template,
                missing.join(", ")
            )));
        }
        Ok(NamePattern(template))
    }

    /// Build a new base name from its parts.
    pub fn render(&self, name: &str, hash: &str, ext: &str) -> String {
        self.0
            .replacen("{name}", name, 1)
            .replacen("{hash}", hash, 1)
            .replacen("{ext}", ext, 1)
    }
}

impl Default for NamePattern {
    fn default() -> Self {
        NamePattern(DEFAULT_PATTERN.to_string())
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Options
// ============================================================================

/// Everything a single fingerprinting run needs.
#[derive(Debug, Clone)]
pub struct FingerprintOptions {
    /// Source paths or glob patterns. Required.
    pub sources: Vec<String>,
    /// Target paths or glob patterns. Empty means no reference rewriting.
    pub targets: Vec<String>,
    /// Fingerprint length in hex characters (1..=32).
    pub hash_length: usize,
    /// Template for the new file names.
    pub pattern: NamePattern,
    /// Copy or rename.
    pub mode: Mode,
    /// How references are matched in targets.
    pub match_mode: MatchMode,
    /// Fail when the source patterns match no file.
    pub require_sources: bool,
    /// Plan only: hash and name, but touch nothing.
    pub dry_run: bool,
}

impl Default for FingerprintOptions {
    fn default() -> Self {
        FingerprintOptions {
            sources: Vec::new(),
            targets: Vec::new(),
            hash_length: DEFAULT_HASH_LENGTH,
            pattern: NamePattern::default(),
            mode: Mode::default(),
            match_mode: MatchMode::default(),
            require_sources: false,
            dry_run: false,
        }
    }
}

impl FingerprintOptions {
    /// Options for the given sources with everything else defaulted.
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FingerprintOptions {
            sources: sources.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the target patterns.
    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the fingerprint length.
    pub fn hash_length(mut self, length: usize) -> Self {
        self.hash_length = length;
        self
    }

    /// Set the file name template.
    pub fn pattern(mut self, pattern: NamePattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Rename sources instead of copying them.
    pub fn rename(mut self, rename: bool) -> Self {
        self.mode = if rename { Mode::Rename } else { Mode::Copy };
        self
    }

    /// Set the match mode.
    pub fn match_mode(mut self, match_mode: MatchMode) -> Self {
        self.match_mode = match_mode;
        self
    }

    /// Treat an empty source match as an error.
    pub fn require_sources(mut self, require: bool) -> Self {
        self.require_sources = require;
        self
    }

    /// Only plan the run.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check the settings that can be checked without touching the filesystem.
    pub fn validate(&self) -> CachekillResult<()> {
        validate_hash_length(self.hash_length)?;
        if self.sources.is_empty() {
            return Err(CachekillError::config("at least one source is required"));
        }
        Ok(())
    }
}

/// Check that `length` is within `1..=32`.
pub fn validate_hash_length(length: usize) -> CachekillResult<()> {
    if (1..=MAX_HASH_LENGTH).contains(&length) {
        Ok(())
    } else {
        Err(CachekillError::config(format!(
            "length must be between 1 and {}, got {}",
            MAX_HASH_LENGTH, length
        )))
    }
}

// ============================================================================
// Tests
// ============================================================================
