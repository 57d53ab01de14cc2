//! Binary entry point for the cachekill CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Copy every stylesheet to a fingerprinted name and update index.html
//! cachekill -s 'dist/**/*.css' -t dist/index.html
//!
//! # Rename in place with 8-character fingerprints
//! cachekill -s dist/app.js -t 'dist/*.html' -l 8 --rename
//!
//! # Preview without touching anything, as JSON
//! cachekill -s dist/app.js -t dist/index.html --dry-run --format json
//! ```

use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgAction, Parser, ValueEnum};

use cachekill::cli::{run_fingerprint, ReportFormat, Reporter};
use cachekill_core::error::{CachekillError, OutputErrorCode};
use cachekill_core::options::{DEFAULT_HASH_LENGTH, DEFAULT_PATTERN};
use cachekill_core::output::FingerprintResponse;
use cachekill_core::{FingerprintOptions, MatchMode, NamePattern};

// ============================================================================
// CLI Structure
// ============================================================================

/// Fingerprint files with a content hash and rewrite references to them.
#[derive(Parser, Debug)]
#[command(
    name = "cachekill",
    version,
    about,
    long_about = None,
    disable_version_flag = true
)]
struct Cli {
    /// Print version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: (),

    /// Source file(s) or globs; a fingerprinted copy is generated for each.
    #[arg(short, long, required = true, num_args = 1..)]
    source: Vec<String>,

    /// Target file(s) or globs whose references to sources are rewritten.
    #[arg(short, long, required = true, num_args = 1..)]
    target: Vec<String>,

    /// Length of the fingerprint (1-32); longer means fewer collisions.
    #[arg(short, long, default_value_t = DEFAULT_HASH_LENGTH)]
    length: usize,

    /// Template for fingerprinted names; must contain {name}, {hash} and {ext}.
    #[arg(short, long, default_value = DEFAULT_PATTERN)]
    pattern: String,

    /// Rename source files instead of generating copies.
    #[arg(short, long)]
    rename: bool,

    /// Suppress the report on stdout.
    #[arg(short, long)]
    quiet: bool,

    /// Show what would happen without changing any file.
    #[arg(long)]
    dry_run: bool,

    /// Only rewrite references not embedded in a longer file name.
    #[arg(long)]
    boundary: bool,

    /// Fail when the source patterns match no file.
    #[arg(long)]
    require_match: bool,

    /// Report format.
    #[arg(long, value_enum, default_value = "text")]
    format: FormatArg,

    /// Log level for tracing output (overridden by RUST_LOG).
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Format of log lines on stderr.
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

/// Report format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// One line per source plus a summary (default).
    #[default]
    Text,
    /// JSON response envelope.
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Format of log lines.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> ExitCode {
    let started = Instant::now();
    let cli = Cli::parse();

    init_tracing(cli.log_level, cli.log_format);

    let reporter = Reporter::new(cli.format.into(), cli.quiet);
    match execute(&cli, started) {
        Ok(response) => {
            let mut stdout = io::stdout();
            let _ = reporter.report(&response, &mut stdout);
            let _ = stdout.flush();
            ExitCode::SUCCESS
        }
        Err(err) => {
            let mut stdout = io::stdout();
            let _ = reporter.report_error(&err, &mut stdout, &mut io::stderr());
            let _ = stdout.flush();
            ExitCode::from(OutputErrorCode::from(&err).code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Build options from the command line and run.
fn execute(cli: &Cli, started: Instant) -> Result<FingerprintResponse, CachekillError> {
    let match_mode = if cli.boundary {
        MatchMode::Boundary
    } else {
        MatchMode::Substring
    };

    let options = FingerprintOptions::new(cli.source.iter().cloned())
        .targets(cli.target.iter().cloned())
        .hash_length(cli.length)
        .pattern(NamePattern::new(cli.pattern.as_str())?)
        .rename(cli.rename)
        .match_mode(match_mode)
        .require_sources(cli.require_match)
        .dry_run(cli.dry_run);

    tracing::debug!(
        sources = options.sources.len(),
        targets = options.targets.len(),
        length = options.hash_length,
        pattern = %options.pattern,
        mode = %options.mode,
        "starting run"
    );

    run_fingerprint(&options, started)
}
