//! Low-level helpers shared by the planner and the executor.

use crate::classify::PathEntry;
use filetime::{FileTime, set_file_times, set_symlink_file_times};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path};

// =============================================================================
// File content copying
// =============================================================================

/// Stream `len` bytes from `src` to `dst`.
///
/// On Linux this uses `copy_file_range` so data stays in the kernel, falling
/// back to a buffered userspace copy when the syscall is unavailable.
pub(crate) fn copy_file_contents(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    #[cfg(target_os = "linux")]
    {
        copy_file_range_all(src, dst, len)
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = len;
        io::copy(&mut io::BufReader::new(src), &mut &*dst)
    }
}

#[cfg(target_os = "linux")]
fn copy_file_range_all(src: &File, dst: &File, len: u64) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;

    const CHUNK: u64 = 128 * 1024 * 1024;

    let src_fd = src.as_raw_fd();
    let dst_fd = dst.as_raw_fd();
    let mut remaining = len;
    let mut copied: u64 = 0;

    while remaining > 0 {
        let chunk_size = remaining.min(CHUNK) as usize;

        // SAFETY: both descriptors are open for the lifetime of the borrows;
        // null offsets mean "use and advance the file position".
        let result = unsafe {
            libc::copy_file_range(
                src_fd,
                std::ptr::null_mut(),
                dst_fd,
                std::ptr::null_mut(),
                chunk_size,
                0,
            )
        };

        if result < 0 {
            let err = io::Error::last_os_error();
            if copied == 0
                && matches!(
                    err.raw_os_error(),
                    Some(libc::EXDEV | libc::ENOSYS | libc::EINVAL | libc::EOPNOTSUPP)
                )
            {
                return io::copy(&mut io::BufReader::new(src), &mut &*dst);
            }
            return Err(err);
        }

        if result == 0 {
            // Source shrank underneath us
            break;
        }

        let n = result as u64;
        copied += n;
        remaining = remaining.saturating_sub(n);
    }

    Ok(copied)
}

// =============================================================================
// Symlinks
// =============================================================================

/// True when any component of a relative link target is `..`.
#[inline]
pub(crate) fn is_escaping_symlink(target: &Path) -> bool {
    target
        .components()
        .any(|c| matches!(c, Component::ParentDir))
}

#[cfg(unix)]
pub(crate) use std::os::unix::fs::symlink;

#[cfg(not(unix))]
pub(crate) fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "Symlinks not supported on this platform",
    ))
}

// =============================================================================
// Directories
// =============================================================================

/// Identity of a directory for cycle detection: `(dev, ino)` on Unix.
#[cfg(unix)]
pub(crate) fn dir_key(path: &Path) -> io::Result<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    let meta = fs::metadata(path)?;
    Ok((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
pub(crate) fn dir_key(path: &Path) -> io::Result<(u64, u64)> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};
    let canonical = path.canonicalize()?;
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    Ok((0, hasher.finish()))
}

/// Remove whatever occupies `path` (file, symlink or directory tree).
pub(crate) fn remove_existing(path: &Path) -> io::Result<()> {
    let ft = fs::symlink_metadata(path)?.file_type();
    if ft.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

// =============================================================================
// Metadata
// =============================================================================

fn file_times(entry: &PathEntry) -> Option<(FileTime, FileTime)> {
    let mtime = FileTime::from_system_time(entry.modified?);
    let atime = entry.accessed.map_or(mtime, FileTime::from_system_time);
    Some((atime, mtime))
}

/// Set `dst`'s access and modification times from `entry`.
pub(crate) fn preserve_timestamps(entry: &PathEntry, dst: &Path) -> io::Result<()> {
    match file_times(entry) {
        Some((atime, mtime)) => set_file_times(dst, atime, mtime),
        None => Ok(()),
    }
}

/// Like [`preserve_timestamps`] but applies to the link itself.
pub(crate) fn preserve_symlink_timestamps(entry: &PathEntry, dst: &Path) -> io::Result<()> {
    match file_times(entry) {
        Some((atime, mtime)) => set_symlink_file_times(dst, atime, mtime),
        None => Ok(()),
    }
}
