//! Copy entry points.
//!
//! A call runs in three phases: validate the configuration, [`plan`] the
//! source tree, then drain the plan on a worker pool. Only configuration
//! and source-root problems abort the call; everything else is reported
//! per entry in the returned [`CopyReport`].

mod exec;
mod pool;
pub(crate) mod utils;

use crate::error::{Error, Result};
use crate::flags::CopyFlags;
use crate::options::CopyOptions;
use crate::plan::plan;
use crate::report::CopyReport;
use std::path::Path;
use std::time::Instant;

/// Copy `source` to `destination` with `threads` workers.
///
/// `flags` is decoded into a [`CopyPolicy`](crate::CopyPolicy); permissions
/// and timestamps are preserved and file data is synced before rename.
///
/// # Errors
///
/// Checked in this order:
/// - [`Error::InvalidFlags`] for contradictory flags
/// - [`Error::InvalidThreadCount`] when `threads` is zero
/// - [`Error::NotFound`], [`Error::PermissionDenied`], [`Error::BrokenLink`]
///   for an unusable source
/// - [`Error::IsADirectory`] for a directory source without `RECURSIVE`
///
/// Per-entry failures do not produce an `Err`; inspect
/// [`CopyReport::failed`].
///
/// # Example
///
/// ```no_run
/// use copycat::{copy, CopyFlags};
/// use std::path::Path;
///
/// let report = copy(
///     Path::new("photos"),
///     Path::new("/mnt/backup/photos"),
///     8,
///     CopyFlags::RECURSIVE | CopyFlags::SKIP_EXISTING,
/// )?;
/// assert!(report.is_success());
/// # Ok::<(), copycat::Error>(())
/// ```
pub fn copy(
    source: &Path,
    destination: &Path,
    threads: usize,
    flags: CopyFlags,
) -> Result<CopyReport> {
    let options = CopyOptions::from_flags(flags)?.with_threads(threads);
    copy_with_options(source, destination, &options)
}

/// Copy `source` to `destination` with fully specified options.
///
/// # Errors
///
/// Same as [`copy`], minus flag decoding.
pub fn copy_with_options(
    source: &Path,
    destination: &Path,
    options: &CopyOptions,
) -> Result<CopyReport> {
    let start_time = Instant::now();

    if options.threads == 0 {
        return Err(Error::InvalidThreadCount(options.threads));
    }

    let plan = plan(source, destination, &options.policy)?;
    let records = pool::run(plan, options)?;
    let report = CopyReport::from_records(records, start_time.elapsed());

    tracing::info!(
        source = %source.display(),
        destination = %destination.display(),
        succeeded = report.succeeded,
        skipped = report.skipped,
        failed = report.failed,
        bytes = report.bytes_copied,
        elapsed_ms = report.duration.as_millis() as u64,
        "copy finished"
    );

    Ok(report)
}
