//! Filesystem side of a run: redirecting self-referencing targets and
//! copying or renaming sources to their fingerprinted names.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{CachekillError, CachekillResult, IoOp};
use crate::naming::SourceEntry;
use crate::options::Mode;

/// Point target entries that are also sources at the sources' new paths.
///
/// Used in copy mode: a source that references other sources is rewritten in
/// its fingerprinted copy, never in the original. A redirected entry can
/// coincide with a copy already in the list (from an earlier run), so the list
/// is de-duplicated afterwards, keeping first occurrences. Returns how many
/// target entries were redirected.
pub fn redirect_self_references(targets: &mut Vec<PathBuf>, entries: &[SourceEntry]) -> usize {
    let mut redirected = 0;
    for entry in entries {
        if let Some(target) = targets.iter_mut().find(|t| **t == entry.original_path) {
            debug!(
                from = %entry.original_path.display(),
                to = %entry.new_path.display(),
                "redirected target to fingerprinted copy"
            );
            *target = entry.new_path.clone();
            redirected += 1;
        }
    }

    let mut seen = HashSet::new();
    targets.retain(|target| seen.insert(target.clone()));
    redirected
}

/// Copy or rename one source to its new path. An existing file at the new
/// path is overwritten.
pub fn apply_file_op(entry: &SourceEntry, mode: Mode) -> CachekillResult<()> {
    match mode {
        Mode::Copy => {
            fs::copy(&entry.original_path, &entry.new_path)
                .map_err(|e| CachekillError::io(IoOp::Copy, &entry.original_path, e))?;
        }
        Mode::Rename => {
            fs::rename(&entry.original_path, &entry.new_path)
                .map_err(|e| CachekillError::io(IoOp::Rename, &entry.original_path, e))?;
        }
    }
    debug!(
        op = %mode,
        from = %entry.original_path.display(),
        to = %entry.new_path.display(),
        "applied file operation"
    );
    Ok(())
}

/// Apply the file operation to every source, in order.
///
/// Stops at the first failure; sources already handled stay as they are.
pub fn apply_file_ops(entries: &[SourceEntry], mode: Mode) -> CachekillResult<()> {
    for entry in entries {
        apply_file_op(entry, mode)?;
    }
    Ok(())
}
