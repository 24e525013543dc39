//! Task outcomes and the aggregate report of a copy call.

use crate::classify::PathKind;
use crate::error::TaskError;
use std::path::PathBuf;
use std::time::Duration;

/// Why a task was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SkipReason {
    /// Destination existed and `SKIP_EXISTING` was set
    AlreadyExists,
    /// Source entry is not a file, directory or symlink
    UnsupportedKind,
    /// The containing directory was itself skipped
    ParentSkipped,
}

/// Result of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TaskOutcome {
    /// Task completed
    Success {
        /// Bytes written (files only)
        bytes: u64,
    },
    /// Task was not attempted
    Skipped(SkipReason),
    /// Task failed
    Failed(TaskError),
}

impl TaskOutcome {
    /// True for [`TaskOutcome::Success`]
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// True for [`TaskOutcome::Failed`]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// One source entry and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TaskRecord {
    /// Source path
    pub source: PathBuf,
    /// Destination path
    pub destination: PathBuf,
    /// Kind of the source entry as classified
    pub kind: PathKind,
    /// Outcome
    pub outcome: TaskOutcome,
}

/// Terminal artifact of one copy call.
///
/// `records` holds exactly one entry per planned source entry, in planning
/// order (ancestors before descendants), regardless of the order in which
/// workers finished.
///
/// # Example
///
/// ```no_run
/// use copycat::{copy, CopyFlags};
/// use std::path::Path;
///
/// let report = copy(Path::new("src"), Path::new("dst"), 4, CopyFlags::RECURSIVE)?;
/// println!("{} ok, {} skipped, {} failed", report.succeeded, report.skipped, report.failed);
/// for failure in report.failures() {
///     eprintln!("{}: {:?}", failure.source.display(), failure.outcome);
/// }
/// # Ok::<(), copycat::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CopyReport {
    /// Tasks that completed
    pub succeeded: u64,
    /// Tasks that were not attempted
    pub skipped: u64,
    /// Tasks that failed
    pub failed: u64,
    /// Total bytes written
    pub bytes_copied: u64,
    /// Wall time of the whole call, planning included
    pub duration: Duration,
    /// Per-entry records
    pub records: Vec<TaskRecord>,
}

impl CopyReport {
    pub(crate) fn from_records(records: Vec<TaskRecord>, duration: Duration) -> Self {
        let mut report = Self {
            duration,
            ..Self::default()
        };
        for record in &records {
            match &record.outcome {
                TaskOutcome::Success { bytes } => {
                    report.succeeded += 1;
                    report.bytes_copied += bytes;
                }
                TaskOutcome::Skipped(_) => report.skipped += 1,
                TaskOutcome::Failed(_) => report.failed += 1,
            }
        }
        report.records = records;
        report
    }

    /// Number of planned entries (always `succeeded + skipped + failed`).
    #[must_use]
    pub fn total(&self) -> u64 {
        self.succeeded + self.skipped + self.failed
    }

    /// True when no task failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Records of failed tasks.
    pub fn failures(&self) -> impl Iterator<Item = &TaskRecord> {
        self.records.iter().filter(|r| r.outcome.is_failed())
    }

    /// `(succeeded, skipped, failed)`
    #[must_use]
    pub fn totals(&self) -> (u64, u64, u64) {
        (self.succeeded, self.skipped, self.failed)
    }
}
