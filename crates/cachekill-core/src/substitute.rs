//! Batched rewriting of old file names to fingerprinted names.
//!
//! All old -> new pairs are compiled into one alternation and applied to a
//! target in a single left-to-right pass. Text produced by one replacement is
//! never scanned again, so a new name can not be re-matched by another pair.
//! Alternatives keep processing order, which puts `nav-button.js` ahead of
//! `button.js` when both could match at the same position.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::bytes::{Captures, Regex};
use tracing::{debug, warn};

use crate::error::{CachekillError, CachekillResult, IoOp};
use crate::naming::SourceEntry;
use crate::options::MatchMode;

/// The old -> new base name pairs of one run.
#[derive(Debug, Clone)]
pub struct FingerprintMapping {
    pairs: Vec<(String, String)>,
    lookup: HashMap<Vec<u8>, Vec<u8>>,
    regex: Option<Regex>,
    match_mode: MatchMode,
}

/// Result of applying a mapping to some content.
#[derive(Debug)]
pub struct Replaced<'a> {
    pub content: Cow<'a, [u8]>,
    pub count: usize,
}

impl FingerprintMapping {
    /// Build the mapping from planned sources, in processing order.
    ///
    /// When two sources share a base name only the first one is mapped.
    pub fn new(entries: &[SourceEntry], match_mode: MatchMode) -> CachekillResult<Self> {
        let mut pairs = Vec::with_capacity(entries.len());
        let mut lookup = HashMap::with_capacity(entries.len());

        for entry in entries {
            let key = entry.original_base.as_bytes().to_vec();
            if lookup.contains_key(&key) {
                warn!(
                    base = %entry.original_base,
                    path = %entry.original_path.display(),
                    "base name already mapped by another source; references keep the first mapping"
                );
                continue;
            }
            lookup.insert(key, entry.new_base.as_bytes().to_vec());
            pairs.push((entry.original_base.clone(), entry.new_base.clone()));
        }

        let regex = if pairs.is_empty() {
            None
        } else {
            let alternation = pairs
                .iter()
                .map(|(old, _)| regex::escape(old))
                .collect::<Vec<_>>()
                .join("|");
            let regex = Regex::new(&alternation)
                .map_err(|e| CachekillError::internal(format!("cannot compile mapping: {}", e)))?;
            Some(regex)
        };

        Ok(FingerprintMapping {
            pairs,
            lookup,
            regex,
            match_mode,
        })
    }

    /// Mapped (old, new) base names, in processing order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Replace every mapped name in `content`.
    pub fn replace<'a>(&self, content: &'a [u8]) -> Replaced<'a> {
        let Some(regex) = &self.regex else {
            return Replaced {
                content: Cow::Borrowed(content),
                count: 0,
            };
        };
        match self.match_mode {
            MatchMode::Substring => self.replace_substrings(regex, content),
            MatchMode::Boundary => self.replace_bounded(regex, content),
        }
    }

    fn replace_substrings<'a>(&self, regex: &Regex, content: &'a [u8]) -> Replaced<'a> {
        let mut count = 0;
        let replaced = regex.replace_all(content, |caps: &Captures| {
            count += 1;
            self.replacement(&caps[0]).to_vec()
        });
        Replaced {
            content: replaced,
            count,
        }
    }

    fn replace_bounded<'a>(&self, regex: &Regex, content: &'a [u8]) -> Replaced<'a> {
        let mut out = Vec::new();
        let mut count = 0;
        let mut last = 0;
        let mut start = 0;

        while let Some(m) = regex.find_at(content, start) {
            if is_bounded(content, m.start(), m.end()) {
                out.extend_from_slice(&content[last..m.start()]);
                out.extend_from_slice(self.replacement(m.as_bytes()));
                last = m.end();
                start = m.end();
                count += 1;
            } else {
                start = m.start() + 1;
            }
            if start >= content.len() {
                break;
            }
        }

        if count == 0 {
            return Replaced {
                content: Cow::Borrowed(content),
                count,
            };
        }
        out.extend_from_slice(&content[last..]);
        Replaced {
            content: Cow::Owned(out),
            count,
        }
    }

    fn replacement<'m>(&'m self, old: &'m [u8]) -> &'m [u8] {
        self.lookup.get(old).map_or(old, Vec::as_slice)
    }

    /// Rewrite one target file in place. Unchanged files are not written.
    pub fn rewrite_file(&self, path: &Path) -> CachekillResult<usize> {
        let content = fs::read(path).map_err(|e| CachekillError::io(IoOp::Read, path, e))?;
        let replaced = self.replace(&content);
        if replaced.count > 0 {
            fs::write(path, &replaced.content)
                .map_err(|e| CachekillError::io(IoOp::Write, path, e))?;
        }
        debug!(target = %path.display(), replacements = replaced.count, "rewrote target");
        Ok(replaced.count)
    }

    /// Count the replacements `path` would receive, without writing it.
    pub fn count_in_file(&self, path: &Path) -> CachekillResult<usize> {
        let content = fs::read(path).map_err(|e| CachekillError::io(IoOp::Read, path, e))?;
        Ok(self.replace(&content).count)
    }

    /// Rewrite every target; returns the total number of replacements.
    ///
    /// Stops at the first failure. Targets already rewritten stay rewritten.
    pub fn rewrite_all(&self, targets: &[PathBuf]) -> CachekillResult<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        let mut total = 0;
        for target in targets {
            total += self.rewrite_file(target)?;
        }
        Ok(total)
    }
}

/// Bytes that can be part of a file name reference.
fn is_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-' | b'.') || !byte.is_ascii()
}

fn is_bounded(content: &[u8], start: usize, end: usize) -> bool {
    let before = start == 0 || !is_name_byte(content[start - 1]);
    let after = end == content.len() || !is_name_byte(content[end]);
    before && after
}
