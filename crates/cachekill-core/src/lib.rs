//! Core engine for cachekill.
//!
//! Fingerprints files by embedding a content hash into their names and
//! rewrites references to the old names inside target files:
//! - Pattern resolution (literal paths and globs)
//! - Content hashing and fingerprinted file names
//! - Batched, single-pass reference substitution
//! - Copy and rename application
//! - Error types, exit codes and JSON output types

pub mod apply;
pub mod error;
pub mod fingerprint;
pub mod hash;
pub mod naming;
pub mod options;
pub mod output;
pub mod resolve;
pub mod substitute;

pub use error::{CachekillError, CachekillResult};
pub use fingerprint::{fingerprint, Plan};
pub use options::{FingerprintOptions, MatchMode, Mode, NamePattern};
pub use output::{FingerprintReport, SourcePath};
