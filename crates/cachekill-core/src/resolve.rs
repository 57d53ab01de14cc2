//! Expansion of source and target patterns into concrete file paths.
//!
//! A pattern is either a literal path or a glob. Globs are compiled with
//! `globset` (`*` stays within one path segment, `**` crosses segments) and
//! matched against the files found by walking the pattern's literal
//! directory prefix.
//!
//! Results are normalized (leading `./` removed) and de-duplicated, keeping
//! the first occurrence, so the same file spelled two ways is one path.

use std::collections::HashSet;
use std::io;
use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{CachekillError, CachekillResult};

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// How a literal pattern naming a missing file is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingLiteral {
    Fail,
    Skip,
}

/// Resolve source patterns.
///
/// A literal path that does not name a file is an error. An empty overall
/// match is only an error when `require_match` is set.
pub fn resolve_sources(patterns: &[String], require_match: bool) -> CachekillResult<Vec<PathBuf>> {
    let files = resolve_all(patterns, MissingLiteral::Fail)?;
    if files.is_empty() && require_match {
        return Err(CachekillError::resolution(
            patterns.join(" "),
            "no source files matched",
        ));
    }
    Ok(files)
}

/// Resolve target patterns. Missing literal paths are skipped with a warning.
pub fn resolve_targets(patterns: &[String]) -> CachekillResult<Vec<PathBuf>> {
    resolve_all(patterns, MissingLiteral::Skip)
}

/// Whether `pattern` contains glob metacharacters.
pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(GLOB_META)
}

/// Drop `.` components so `./a.css` and `a.css` compare equal.
pub fn normalize(path: &Path) -> PathBuf {
    let normalized: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

fn resolve_all(patterns: &[String], missing: MissingLiteral) -> CachekillResult<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        let matched = if is_glob(pattern) {
            expand_glob(pattern)?
        } else {
            expand_literal(pattern, missing)?
        };
        debug!(pattern = %pattern, matched = matched.len(), "resolved pattern");
        for path in matched {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    Ok(files)
}

fn expand_literal(pattern: &str, missing: MissingLiteral) -> CachekillResult<Vec<PathBuf>> {
    let path = normalize(Path::new(pattern));
    if path.is_file() {
        return Ok(vec![path]);
    }

    let reason = if path.exists() {
        "not a file"
    } else {
        "no such file"
    };
    match missing {
        MissingLiteral::Fail => Err(CachekillError::resolution(pattern, reason)),
        MissingLiteral::Skip => {
            warn!(pattern = %pattern, "skipping target: {}", reason);
            Ok(Vec::new())
        }
    }
}

fn expand_glob(pattern: &str) -> CachekillResult<Vec<PathBuf>> {
    let (base, rest) = split_glob(pattern);
    let normalized = rest_pattern(&base, &rest);

    let matcher = GlobBuilder::new(&normalized)
        .literal_separator(true)
        .build()
        .map_err(|e| CachekillError::resolution(pattern, e.to_string()))?
        .compile_matcher();

    let mut walker = WalkDir::new(&base).sort_by_file_name();
    if !rest.iter().any(|segment| segment.contains("**")) {
        walker = walker.max_depth(rest.len());
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 && is_not_found(&err) => return Ok(Vec::new()),
            Err(err) => return Err(CachekillError::resolution(pattern, err.to_string())),
        };
        if !entry.path().is_file() {
            continue;
        }
        let path = normalize(entry.path());
        if matcher.is_match(&path) {
            files.push(path);
        }
    }

    Ok(files)
}

/// Split a glob into its literal directory prefix and the remaining segments.
fn split_glob(pattern: &str) -> (PathBuf, Vec<String>) {
    let segments: Vec<&str> = pattern.split('/').collect();
    let literal = segments
        .iter()
        .take(segments.len() - 1)
        .take_while(|segment| !is_glob(segment))
        .count();

    let prefix = segments[..literal].join("/");
    let base = if prefix.is_empty() && pattern.starts_with('/') {
        PathBuf::from("/")
    } else if prefix.is_empty() {
        PathBuf::from(".")
    } else {
        normalize(Path::new(&prefix))
    };

    let rest = segments[literal..]
        .iter()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
        .collect();
    (base, rest)
}

/// The glob to match walked paths against, expressed relative to how the
/// walker reports them (normalized, rooted at `base`).
fn rest_pattern(base: &Path, rest: &[String]) -> String {
    let rest = rest.join("/");
    if base == Path::new(".") {
        rest
    } else {
        let base = base.to_string_lossy();
        if base.ends_with('/') {
            format!("{}{}", base, rest)
        } else {
            format!("{}/{}", base, rest)
        }
    }
}

fn is_not_found(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}

// ============================================================================
// Tests
// ============================================================================
