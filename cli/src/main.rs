//! ccp - multithreaded copy
//!
//! A command-line front end for the copycat engine.

use clap::{Parser, ValueEnum};
use copycat::{
    CopyFlags, CopyOptions, CopyReport, Error as CopyError, SkipReason, TaskError, TaskOutcome,
    TaskRecord, copy_with_options, create_progress_bar, progress_callback,
};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

/// ccp - copy files and directories with a pool of worker threads
///
/// Usage:
///   ccp SOURCE DEST
///   ccp -r SOURCE_DIR DEST_DIR
#[derive(Parser, Debug)]
#[command(name = "ccp", version, about, long_about = None)]
struct Args {
    /// Source file, directory or symlink
    source: PathBuf,

    /// Destination path
    ///
    /// A file source is placed inside DESTINATION when it is an existing
    /// directory. A directory source is mirrored at DESTINATION.
    destination: PathBuf,

    /// Number of worker threads (default: one per CPU)
    #[arg(short = 't', long, value_name = "N")]
    threads: Option<usize>,

    /// Copy directories recursively
    #[arg(short = 'r', long)]
    recursive: bool,

    /// Replace existing destination entries
    #[arg(long)]
    overwrite: bool,

    /// Leave existing destination entries untouched
    #[arg(long)]
    skip_existing: bool,

    /// Fail entries whose destination exists (the default)
    #[arg(long)]
    no_overwrite: bool,

    /// Copy what symlinks point to instead of the links
    #[arg(short = 'L', long)]
    follow_symlinks: bool,

    /// Do not preserve permissions and timestamps
    #[arg(long)]
    no_metadata: bool,

    /// Do not call fsync after each file (faster but less safe)
    #[arg(long)]
    no_sync: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Log level
    #[arg(short = 'l', long, value_enum, default_value = "info")]
    level: LogLevel,

    /// Disable progress bar and summary
    #[arg(short = 'q', long)]
    quiet: bool,
}

impl Args {
    fn flags(&self) -> CopyFlags {
        let mut flags = CopyFlags::empty();
        flags.set(CopyFlags::RECURSIVE, self.recursive);
        flags.set(CopyFlags::OVERWRITE, self.overwrite);
        flags.set(CopyFlags::SKIP_EXISTING, self.skip_existing);
        flags.set(CopyFlags::NO_OVERWRITE, self.no_overwrite);
        flags.set(CopyFlags::FOLLOW_SYMLINKS, self.follow_symlinks);
        flags
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Info,
    Debug,
    Off,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Off => LevelFilter::OFF,
        }
    }
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Copy(#[from] CopyError),

    #[error("{failed} of {total} entries failed")]
    Incomplete { failed: u64, total: u64 },

    #[error("Failed to install logger: {0}")]
    Logger(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Failed to serialize JSON output: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Copy(CopyError::InvalidFlags { .. } | CopyError::InvalidThreadCount(_)) => 2,
            _ => 1,
        }
    }
}

fn main() {
    let args = Args::parse();
    if let Err(error) = run(&args) {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

fn run(args: &Args) -> CliResult<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(args.level))
        .with_writer(std::io::stderr)
        .with_thread_ids(true)
        .without_time()
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!(?args);

    let mut options = CopyOptions::from_flags(args.flags())?;
    if let Some(threads) = args.threads {
        options = options.with_threads(threads);
    }
    if args.no_metadata {
        options = options.without_metadata();
    }
    if args.no_sync {
        options = options.without_fsync();
    }

    let pb = (args.output == OutputMode::Human && !args.quiet).then(|| create_progress_bar(0));
    if let Some(pb) = &pb {
        options = options.with_progress(progress_callback(pb.clone()));
    }

    let result = copy_with_options(&args.source, &args.destination, &options);

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    let report = result?;

    match args.output {
        OutputMode::Human => print_report(&report, args.quiet),
        OutputMode::Json => {
            let value = report_json(&report, &options)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::Incomplete {
            failed: report.failed,
            total: report.total(),
        })
    }
}

fn print_report(report: &CopyReport, quiet: bool) {
    for record in report.failures() {
        if let TaskOutcome::Failed(error) = &record.outcome {
            eprintln!("failed: {}: {error}", record.source.display());
        }
    }

    if quiet {
        return;
    }

    if report.succeeded == 0 && report.failed == 0 {
        if report.skipped > 0 {
            println!("Nothing to copy ({} entries already exist)", report.skipped);
        } else {
            println!("Nothing to copy");
        }
        return;
    }

    println!(
        "Copied {} entries ({}) in {:.2?}",
        report.succeeded,
        format_bytes(report.bytes_copied),
        report.duration
    );
    if report.skipped > 0 {
        println!("  Skipped: {}", report.skipped);
    }
    if report.failed > 0 {
        println!("  Failed:  {}", report.failed);
    }
}

fn report_json(report: &CopyReport, options: &CopyOptions) -> CliResult<Value> {
    Ok(json!({
        "schema_version": "1.0",
        "threads": options.threads,
        "policy": serde_json::to_value(options.policy)?,
        "summary": {
            "succeeded": report.succeeded,
            "skipped": report.skipped,
            "failed": report.failed,
            "bytes_copied": report.bytes_copied,
            "duration_ms": report.duration.as_millis() as u64,
        },
        "records": report
            .records
            .iter()
            .map(record_json)
            .collect::<CliResult<Vec<_>>>()?,
    }))
}

fn record_json(record: &TaskRecord) -> CliResult<Value> {
    let mut obj = Map::new();
    obj.insert("source".to_owned(), display_path(&record.source).into());
    obj.insert(
        "destination".to_owned(),
        display_path(&record.destination).into(),
    );
    obj.insert("kind".to_owned(), serde_json::to_value(record.kind)?);

    match &record.outcome {
        TaskOutcome::Success { bytes } => {
            obj.insert("outcome".to_owned(), "copied".into());
            obj.insert("bytes_copied".to_owned(), (*bytes).into());
        }
        TaskOutcome::Skipped(reason) => {
            obj.insert("outcome".to_owned(), "skipped".into());
            obj.insert("reason".to_owned(), skip_reason(*reason).into());
        }
        TaskOutcome::Failed(error) => {
            obj.insert("outcome".to_owned(), "failed".into());
            obj.insert("error_code".to_owned(), error_code(error).into());
            obj.insert("error_message".to_owned(), error.to_string().into());
        }
    }

    Ok(Value::Object(obj))
}

fn skip_reason(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::AlreadyExists => "already_exists",
        SkipReason::UnsupportedKind => "unsupported_kind",
        SkipReason::ParentSkipped => "parent_skipped",
    }
}

fn error_code(error: &TaskError) -> &'static str {
    match error {
        TaskError::DestinationExists(_) => "destination_exists",
        TaskError::BrokenLink(_) => "broken_link",
        TaskError::SymlinkLoop(_) => "symlink_loop",
        TaskError::ParentUnavailable(_) => "parent_unavailable",
        _ => "io_failure",
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}
