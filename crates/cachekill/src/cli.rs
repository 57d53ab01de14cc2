//! CLI front door: run a fingerprinting pass and report it.
//!
//! Reporting is explicit: the caller decides on format and quiet mode and
//! passes them in through a [`Reporter`]. Nothing here touches global state.
//!
//! ## Text Output
//!
//! ```text
//! copied: dist/app.js --> dist/app-3f2504e5.js
//! 1 target file(s) updated in 4ms
//! ```
//!
//! ## JSON Output
//!
//! A single [`FingerprintResponse`] on success or an [`ErrorResponse`] on failure.

use std::io::{self, Write};
use std::time::Instant;

use cachekill_core::error::CachekillError;
use cachekill_core::output::{emit_response, ErrorResponse, FingerprintResponse};
use cachekill_core::{fingerprint, FingerprintOptions};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One line per source plus a summary line.
    #[default]
    Text,
    /// JSON envelope.
    Json,
}

/// Run a fingerprinting pass and wrap the result for output.
///
/// `started` is when the invocation began; the elapsed time reported is
/// measured from it.
pub fn run_fingerprint(
    options: &FingerprintOptions,
    started: Instant,
) -> Result<FingerprintResponse, CachekillError> {
    let report = fingerprint(options)?;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(FingerprintResponse::new(
        report,
        options.mode,
        options.dry_run,
        elapsed_ms,
    ))
}

/// Render the text report for a successful run.
pub fn render_text(response: &FingerprintResponse) -> String {
    let verb = if response.dry_run {
        format!("would {}", response.mode)
    } else {
        response.mode.verb().to_string()
    };

    let mut out = String::new();
    for source in &response.report.source_paths {
        out.push_str(&format!(
            "{}: {} --> {}\n",
            verb,
            source.path.display(),
            source.new_path.display()
        ));
    }

    let count = response.report.target_count();
    if response.dry_run {
        out.push_str(&format!(
            "{} target file(s) would be updated ({} replacement(s))\n",
            count, response.report.replacements
        ));
    } else {
        out.push_str(&format!(
            "{} target file(s) updated in {}ms\n",
            count, response.elapsed_ms
        ));
    }
    out
}

/// Writes results and errors in the chosen format.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    format: ReportFormat,
    quiet: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, quiet: bool) -> Self {
        Reporter { format, quiet }
    }

    /// Write a successful result to `out`. Quiet mode writes nothing.
    pub fn report(&self, response: &FingerprintResponse, out: &mut impl Write) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        match self.format {
            ReportFormat::Text => out.write_all(render_text(response).as_bytes()),
            ReportFormat::Json => emit_response(response, out),
        }
    }

    /// Write an error. Text goes to `err_out`, JSON to `out`; quiet mode does not apply.
    pub fn report_error(
        &self,
        err: &CachekillError,
        out: &mut impl Write,
        err_out: &mut impl Write,
    ) -> io::Result<()> {
        match self.format {
            ReportFormat::Text => writeln!(err_out, "error: {}", err),
            ReportFormat::Json => emit_response(&ErrorResponse::from_error(err), out),
        }
    }
}
