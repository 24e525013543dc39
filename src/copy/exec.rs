//! Execution of a single task.
//!
//! Files are written to a temporary file in the destination directory and
//! renamed into place, so a failed copy never leaves a partial destination
//! file behind. Without `replace` the rename uses `persist_noclobber`, which
//! fails if something appeared at the destination after the conflict probe.

use crate::error::{TaskError, is_no_space_error};
use crate::flags::ConflictPolicy;
use crate::options::CopyOptions;
use crate::plan::{CopyTask, TaskKind};
use crate::report::{SkipReason, TaskOutcome};
use std::fs::{self, File};
use std::io;
use std::path::Path;

use super::utils::{
    copy_file_contents, is_escaping_symlink, preserve_symlink_timestamps, preserve_timestamps,
    remove_existing, symlink,
};

/// Run `task`. With `replace` set, whatever occupies the destination is
/// removed first.
pub(crate) fn execute(task: &CopyTask, replace: bool, options: &CopyOptions) -> TaskOutcome {
    let result = match task.kind {
        TaskKind::CreateDirectory => create_directory(task, replace),
        TaskKind::CopyFile => copy_file(task, replace, options),
        TaskKind::RecreateSymlink => recreate_symlink(task, replace, options),
    };

    match result {
        Ok(bytes) => TaskOutcome::Success { bytes },
        // Lost the race against another writer after the probe said "absent"
        Err(TaskError::DestinationExists(_))
            if options.policy.conflict() == ConflictPolicy::Skip =>
        {
            TaskOutcome::Skipped(SkipReason::AlreadyExists)
        }
        Err(e) => TaskOutcome::Failed(e),
    }
}

/// Apply permissions and timestamps to a directory once everything inside
/// it has been written.
pub(crate) fn finish_directory(task: &CopyTask, options: &CopyOptions) {
    if !options.preserve_metadata {
        return;
    }
    let dst = &task.destination;
    if let Err(e) = preserve_timestamps(&task.entry, dst) {
        tracing::warn!(path = %dst.display(), error = %e, "failed to set directory times");
    }
    if let Err(e) = fs::set_permissions(dst, task.entry.permissions.clone()) {
        tracing::warn!(path = %dst.display(), error = %e, "failed to set directory permissions");
    }
}

fn clear_destination(dst: &Path) -> Result<(), TaskError> {
    match remove_existing(dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TaskError::io(dst, &e)),
    }
}

fn create_directory(task: &CopyTask, replace: bool) -> Result<u64, TaskError> {
    let dst = &task.destination;
    if replace {
        clear_destination(dst)?;
    }
    fs::create_dir_all(dst).map_err(|e| TaskError::io(dst, &e))?;
    Ok(0)
}

fn copy_file(task: &CopyTask, replace: bool, options: &CopyOptions) -> Result<u64, TaskError> {
    let src = &task.entry.path;
    let dst = &task.destination;

    let src_file = File::open(src).map_err(|e| TaskError::io(src, &e))?;
    // The file may have changed since planning
    let len = src_file
        .metadata()
        .map_err(|e| TaskError::io(src, &e))?
        .len();

    if replace {
        clear_destination(dst)?;
    }

    #[cfg(all(feature = "reflink", any(target_os = "linux", target_os = "macos")))]
    if reflink_copy::reflink(src, dst).is_ok() {
        if options.preserve_metadata {
            fs::set_permissions(dst, task.entry.permissions.clone())
                .map_err(|e| TaskError::io(dst, &e))?;
            apply_file_times(task);
        }
        return Ok(len);
    }

    let dst_parent = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".copycat-");
    #[cfg(unix)]
    if !options.preserve_metadata {
        use std::os::unix::fs::PermissionsExt;
        // Let the umask decide, as a plain create would
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let temp_file = builder
        .tempfile_in(dst_parent)
        .map_err(|e| TaskError::io(dst_parent, &e))?;

    let bytes = copy_file_contents(&src_file, temp_file.as_file(), len)
        .map_err(|e| io_failure(dst, &e))?;

    if options.fsync {
        temp_file
            .as_file()
            .sync_all()
            .map_err(|e| io_failure(dst, &e))?;
    }

    if options.preserve_metadata {
        fs::set_permissions(temp_file.path(), task.entry.permissions.clone())
            .map_err(|e| TaskError::io(dst, &e))?;
    }

    let persisted = if replace {
        temp_file.persist(dst)
    } else {
        temp_file.persist_noclobber(dst)
    };
    if let Err(e) = persisted {
        return Err(if e.error.kind() == io::ErrorKind::AlreadyExists {
            TaskError::DestinationExists(dst.clone())
        } else {
            TaskError::io(dst, &e.error)
        });
    }

    if options.preserve_metadata {
        apply_file_times(task);
    }

    Ok(bytes)
}

/// Copy source times onto the written file. Failure only costs metadata.
fn apply_file_times(task: &CopyTask) {
    let dst = &task.destination;
    if let Err(e) = preserve_timestamps(&task.entry, dst) {
        tracing::debug!(path = %dst.display(), error = %e, "failed to set file times");
    }
}

fn recreate_symlink(
    task: &CopyTask,
    replace: bool,
    options: &CopyOptions,
) -> Result<u64, TaskError> {
    let src = &task.entry.path;
    let dst = &task.destination;

    let target = fs::read_link(src).map_err(|e| TaskError::io(src, &e))?;
    if target.is_relative() && is_escaping_symlink(&target) {
        tracing::warn!(
            link = %src.display(),
            target = %target.display(),
            "symlink uses relative path escaping upward"
        );
    }

    if replace {
        clear_destination(dst)?;
    }

    symlink(&target, dst).map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            TaskError::DestinationExists(dst.clone())
        } else {
            TaskError::io(dst, &e)
        }
    })?;

    if options.preserve_metadata {
        if let Err(e) = preserve_symlink_timestamps(&task.entry, dst) {
            tracing::debug!(path = %dst.display(), error = %e, "failed to set symlink times");
        }
    }

    Ok(0)
}

fn io_failure(path: &Path, error: &io::Error) -> TaskError {
    if is_no_space_error(error) {
        tracing::error!(path = %path.display(), "no space left on destination device");
    }
    TaskError::io(path, error)
}
