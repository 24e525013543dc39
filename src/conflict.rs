//! Destination conflict resolution.
//!
//! A task's destination is probed right before the task runs and the result
//! is fed to [`resolve`], which is a pure decision:
//!
//! | Destination | Policy | Disposition |
//! |-------------|--------|-------------|
//! | absent | any | `Proceed` |
//! | directory, task creates a directory | any | `Proceed` (merge) |
//! | link to a directory, task creates the root | any | `Proceed` (merge) |
//! | present | `Skip` | `Skip(AlreadyExists)` |
//! | present | `Fail` | `Fail(DestinationExists)` |
//! | present | `Overwrite` | `Replace` |
//!
//! The probe and the later write are separate syscalls. Two concurrent
//! invocations targeting the same path can race; a single plan never
//! targets the same destination twice.

use crate::classify::PathKind;
use crate::error::TaskError;
use crate::flags::ConflictPolicy;
use crate::plan::{CopyTask, TaskKind};
use crate::report::SkipReason;
use std::fs;
use std::io;
use std::path::Path;

/// Decision for one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Destination is free (or a directory to merge into)
    Proceed,
    /// Remove the existing entry, then proceed
    Replace,
    /// Do nothing and report the task skipped
    Skip(SkipReason),
    /// Do nothing and report the task failed
    Fail(TaskError),
}

/// What currently occupies `path`, without following symlinks.
///
/// # Errors
///
/// Any stat failure other than "not found" is reported as
/// [`TaskError::IoFailure`].
pub fn probe(path: &Path) -> Result<Option<PathKind>, TaskError> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(Some(PathKind::of(&meta))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TaskError::io(path, &e)),
    }
}

/// What currently occupies `task`'s destination.
///
/// Like [`probe`], except that a symlink to a directory at the root of a
/// directory copy reports as [`PathKind::Directory`], so the tree is merged
/// into the linked directory the same way a single file lands inside it.
///
/// # Errors
///
/// As for [`probe`].
pub fn probe_task(task: &CopyTask) -> Result<Option<PathKind>, TaskError> {
    let existing = probe(&task.destination)?;
    if existing == Some(PathKind::Symlink)
        && task.kind == TaskKind::CreateDirectory
        && task.parent.is_none()
        && task.destination.is_dir()
    {
        return Ok(Some(PathKind::Directory));
    }
    Ok(existing)
}

/// Decide what to do with `task` given the destination's current state.
#[must_use]
pub fn resolve(
    task: &CopyTask,
    existing: Option<PathKind>,
    policy: ConflictPolicy,
) -> Disposition {
    let Some(existing) = existing else {
        return Disposition::Proceed;
    };

    if task.kind == TaskKind::CreateDirectory && existing == PathKind::Directory {
        return Disposition::Proceed;
    }

    match policy {
        ConflictPolicy::Skip => Disposition::Skip(SkipReason::AlreadyExists),
        ConflictPolicy::Fail => {
            Disposition::Fail(TaskError::DestinationExists(task.destination.clone()))
        }
        ConflictPolicy::Overwrite => Disposition::Replace,
    }
}
