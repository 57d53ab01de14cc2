//! The fingerprinting run: resolve, hash, then copy or rename and rewrite.
//!
//! A run has two phases. [`Plan::build`] resolves every pattern and hashes
//! every source without touching the filesystem. [`Plan::execute`] then
//! mutates it, in an order that depends on the mode:
//!
//! - **Copy:** redirect targets that are themselves sources to their copies,
//!   copy every source, then rewrite the targets.
//! - **Rename:** rewrite the targets, then rename every source.
//!
//! Nothing is rolled back on failure.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::apply::{apply_file_ops, redirect_self_references};
use crate::error::CachekillResult;
use crate::naming::{colliding_paths, plan_sources, SourceEntry};
use crate::options::{FingerprintOptions, Mode};
use crate::output::{FingerprintReport, SourcePath};
use crate::resolve::{resolve_sources, resolve_targets};
use crate::substitute::FingerprintMapping;

/// Fingerprint the sources in `options` and rewrite references in its targets.
///
/// With `dry_run` set, the plan is reported without changing anything.
pub fn fingerprint(options: &FingerprintOptions) -> CachekillResult<FingerprintReport> {
    let plan = Plan::build(options)?;
    if options.dry_run {
        plan.preview()
    } else {
        plan.execute()
    }
}

/// Everything a run will do, computed before any file is touched.
#[derive(Debug)]
pub struct Plan {
    /// Sources in processing order (descending path).
    pub entries: Vec<SourceEntry>,
    /// Resolved targets, before any copy-mode redirect.
    pub targets: Vec<PathBuf>,
    /// Batched old -> new base names.
    pub mapping: FingerprintMapping,
    /// Copy or rename.
    pub mode: Mode,
}

impl Plan {
    /// Resolve patterns and hash every source.
    pub fn build(options: &FingerprintOptions) -> CachekillResult<Self> {
        options.validate()?;

        let sources = resolve_sources(&options.sources, options.require_sources)?;
        let targets = if options.targets.is_empty() {
            Vec::new()
        } else {
            resolve_targets(&options.targets)?
        };

        let entries = plan_sources(&sources, options.hash_length, &options.pattern)?;
        for path in colliding_paths(&entries) {
            warn!(
                path = %path.display(),
                length = options.hash_length,
                "several sources map to the same fingerprinted path"
            );
        }

        let mapping = FingerprintMapping::new(&entries, options.match_mode)?;
        for (old, new) in mapping.pairs() {
            debug!(old = %old, new = %new, "mapped base name");
        }

        Ok(Plan {
            entries,
            targets,
            mapping,
            mode: options.mode,
        })
    }

    /// Report what [`Plan::execute`] would do, reading targets but writing nothing.
    ///
    /// In copy mode a redirected target is counted against its source, which
    /// is what the copy would contain.
    pub fn preview(self) -> CachekillResult<FingerprintReport> {
        let mut targets = self.targets;
        if self.mode == Mode::Copy {
            redirect_self_references(&mut targets, &self.entries);
        }

        let mut replacements = 0;
        for target in &targets {
            let content_of = match self.mode {
                Mode::Copy => self
                    .entries
                    .iter()
                    .find(|entry| entry.new_path == *target)
                    .map_or(target.as_path(), |entry| entry.original_path.as_path()),
                Mode::Rename => target.as_path(),
            };
            replacements += self.mapping.count_in_file(content_of)?;
        }
        Ok(report(&self.entries, targets, replacements))
    }

    /// Perform the file operations and rewrite the targets.
    pub fn execute(self) -> CachekillResult<FingerprintReport> {
        let Plan {
            entries,
            mut targets,
            mapping,
            mode,
        } = self;

        let replacements = match mode {
            Mode::Copy => {
                redirect_self_references(&mut targets, &entries);
                apply_file_ops(&entries, Mode::Copy)?;
                mapping.rewrite_all(&targets)?
            }
            Mode::Rename => {
                let replacements = mapping.rewrite_all(&targets)?;
                apply_file_ops(&entries, Mode::Rename)?;
                replacements
            }
        };

        info!(
            mode = %mode,
            sources = entries.len(),
            targets = targets.len(),
            replacements,
            "fingerprinting complete"
        );
        Ok(report(&entries, targets, replacements))
    }
}

fn report(entries: &[SourceEntry], targets: Vec<PathBuf>, replacements: usize) -> FingerprintReport {
    FingerprintReport {
        source_paths: entries.iter().map(SourcePath::from).collect(),
        target_paths: (!targets.is_empty()).then_some(targets),
        replacements,
    }
}
