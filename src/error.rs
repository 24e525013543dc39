//! Error types for copycat.
//!
//! Two layers of errors exist:
//!
//! - [`Error`] aborts a whole copy call before any task executes
//!   (bad flags, bad thread count, an unreadable source root, ...).
//! - [`TaskError`] is carried inside [`TaskOutcome::Failed`](crate::TaskOutcome::Failed)
//!   and only affects the one task it belongs to. The run keeps draining.
//!
//! # Error Categories
//!
//! | Category | Errors |
//! |----------|--------|
//! | Configuration | [`Error::InvalidFlags`], [`Error::InvalidThreadCount`], [`Error::ThreadPool`] |
//! | Source root | [`Error::NotFound`], [`Error::PermissionDenied`], [`Error::IsADirectory`], [`Error::BrokenLink`], [`Error::Io`] |
//! | Per task | [`TaskError::DestinationExists`], [`TaskError::BrokenLink`], [`TaskError::SymlinkLoop`], [`TaskError::ParentUnavailable`], [`TaskError::IoFailure`] |

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for copycat operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a copy call before any task executes.
///
/// When one of these is returned nothing has been written to the
/// destination.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// `OVERWRITE` and `NO_OVERWRITE` were both set
    #[error("Invalid flags {bits:#x}: OVERWRITE and NO_OVERWRITE are mutually exclusive")]
    InvalidFlags {
        /// The raw bitmask that was rejected
        bits: u32,
    },

    /// Thread count below one
    #[error("Invalid thread count {0}: at least one worker thread is required")]
    InvalidThreadCount(usize),

    /// Path does not exist
    #[error("Path does not exist: {0}")]
    NotFound(PathBuf),

    /// Path could not be inspected due to permissions
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Directory source given without the `RECURSIVE` flag
    #[error("Source is a directory, set RECURSIVE to copy it: {0}")]
    IsADirectory(PathBuf),

    /// Symlink target could not be resolved while following symlinks
    #[error("Broken symlink: {0}")]
    BrokenLink(PathBuf),

    /// The worker pool could not be started
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Any other IO error while inspecting the source root
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path being inspected
        path: PathBuf,
        /// Underlying error
        source: io::Error,
    },
}

impl Error {
    /// Map an IO error raised while inspecting `path` onto the taxonomy.
    pub(crate) fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Why a single task failed.
///
/// Details are stored as strings so outcomes can be cloned, compared and
/// (with the `serde` feature) serialized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[non_exhaustive]
pub enum TaskError {
    /// Destination is occupied and no permissive flag was set
    #[error("Destination already exists: {0}")]
    DestinationExists(PathBuf),

    /// Symlink target could not be resolved while following symlinks
    #[error("Broken symlink: {0}")]
    BrokenLink(PathBuf),

    /// Directory was already visited through another symlink
    #[error("Symlink loop detected: {0}")]
    SymlinkLoop(PathBuf),

    /// The containing directory could not be created
    #[error("Parent directory was not created: {0}")]
    ParentUnavailable(PathBuf),

    /// Lower-level filesystem failure
    #[error("IO failure at {path}: {detail}")]
    IoFailure {
        /// Path the failing operation targeted
        path: PathBuf,
        /// Rendered error message
        detail: String,
    },
}

impl TaskError {
    pub(crate) fn io(path: &Path, error: &io::Error) -> Self {
        Self::IoFailure {
            path: path.to_path_buf(),
            detail: error.to_string(),
        }
    }
}

/// Check if an IO error indicates "no space left on device".
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | Unix | `ENOSPC` (errno 28) |
/// | Windows | `ERROR_DISK_FULL` (0x70) |
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    if let Some(raw_error) = error.raw_os_error() {
        const ENOSPC: i32 = 28;
        return raw_error == ENOSPC;
    }

    #[cfg(windows)]
    if let Some(raw_error) = error.raw_os_error() {
        const ERROR_DISK_FULL: i32 = 112;
        return raw_error == ERROR_DISK_FULL;
    }

    false
}
