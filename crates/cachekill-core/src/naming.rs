//! Fingerprinted file names for resolved sources.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{CachekillError, CachekillResult};
use crate::hash::fingerprint_file;
use crate::options::NamePattern;

/// One resolved source and the name it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Where the source lives now.
    pub original_path: PathBuf,
    /// File name of the source, e.g. `app.js`.
    pub original_base: String,
    /// Fingerprinted file name, e.g. `app-3f2504e5.js`.
    pub new_base: String,
    /// `original_path` with its file name replaced by `new_base`.
    pub new_path: PathBuf,
}

impl SourceEntry {
    /// Name `path` using an already computed fingerprint.
    pub fn new(path: &Path, fingerprint: &str, pattern: &NamePattern) -> CachekillResult<Self> {
        let original_base = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| CachekillError::InvalidPath {
                path: path.to_path_buf(),
                reason: "file name is missing or not valid UTF-8".to_string(),
            })?
            .to_string();

        let (name, ext) = split_base(&original_base);
        let new_base = pattern.render(name, fingerprint, ext);
        let new_path = path.with_file_name(&new_base);

        Ok(SourceEntry {
            original_path: path.to_path_buf(),
            original_base,
            new_base,
            new_path,
        })
    }

    /// Hash the file at `path` and name it.
    pub fn plan(path: &Path, length: usize, pattern: &NamePattern) -> CachekillResult<Self> {
        let fingerprint = fingerprint_file(path, length)?;
        SourceEntry::new(path, &fingerprint, pattern)
    }
}

/// Split a file name into stem and extension; the extension keeps its dot.
///
/// `app.min.js` -> (`app.min`, `.js`), `.env` -> (`.env`, ``), `Makefile` -> (`Makefile`, ``).
pub fn split_base(base: &str) -> (&str, &str) {
    match base.rfind('.') {
        None | Some(0) => (base, ""),
        Some(idx) => base.split_at(idx),
    }
}

/// Order sources for processing: descending by full path.
///
/// `nav-button.js` sorts before `button.js`, so a longer name that ends with
/// a shorter one is always mapped first.
pub fn sort_for_processing(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| b.as_os_str().cmp(a.as_os_str()));
}

/// Hash and name every source, in processing order.
///
/// Every source is read before anything is returned, so a read failure
/// aborts the run before any file is touched.
pub fn plan_sources(
    paths: &[PathBuf],
    length: usize,
    pattern: &NamePattern,
) -> CachekillResult<Vec<SourceEntry>> {
    let mut ordered = paths.to_vec();
    sort_for_processing(&mut ordered);
    ordered
        .iter()
        .map(|path| SourceEntry::plan(path, length, pattern))
        .collect()
}

/// New paths claimed by more than one source.
pub fn colliding_paths(entries: &[SourceEntry]) -> Vec<&Path> {
    let mut counts: HashMap<&Path, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(entry.new_path.as_path()).or_default() += 1;
    }
    let mut collisions: Vec<&Path> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(path, _)| path)
        .collect();
    collisions.sort();
    collisions
}
