//! Content hashing for fingerprints.

use std::fmt;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{CachekillError, CachekillResult, IoOp};
use crate::options::validate_hash_length;

/// SHA-256 digest of some content, stored as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    /// Compute the SHA-256 hash of the given bytes.
    pub fn compute(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        ContentHash(hex::encode(hasher.finalize()))
    }

    /// The first `length` hex characters of the digest.
    ///
    /// `length` is clamped to the digest size; callers validate it beforehand.
    pub fn truncated(&self, length: usize) -> &str {
        &self.0[..length.min(self.0.len())]
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read `path` and return its fingerprint: the digest truncated to `length`.
pub fn fingerprint_file(path: &Path, length: usize) -> CachekillResult<String> {
    validate_hash_length(length)?;
    let content = fs::read(path).map_err(|e| CachekillError::io(IoOp::Read, path, e))?;
    Ok(ContentHash::compute(&content).truncated(length).to_string())
}
