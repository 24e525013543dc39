//! Filesystem entry classification.
//!
//! [`classify`] performs a single read-only stat of a path and reports what
//! kind of entry it is, together with the metadata the executor propagates.

use crate::error::{Error, Result};
use std::fs::{self, Metadata, Permissions};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Kind of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PathKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Symbolic link (only when symlinks are not followed)
    Symlink,
    /// Sockets, devices, FIFOs and anything else
    Unsupported,
}

impl PathKind {
    pub(crate) fn of(meta: &Metadata) -> Self {
        let ft = meta.file_type();
        if ft.is_symlink() {
            Self::Symlink
        } else if ft.is_dir() {
            Self::Directory
        } else if ft.is_file() {
            Self::File
        } else {
            Self::Unsupported
        }
    }
}

/// A classified filesystem node.
///
/// `path` is the location that was inspected. When symlinks are followed it
/// still names the link, while the remaining fields describe the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathEntry {
    /// Inspected path
    pub path: PathBuf,
    /// Entry kind
    pub kind: PathKind,
    /// Size in bytes (files only, otherwise 0)
    pub size: u64,
    /// Permission bits
    pub permissions: Permissions,
    /// Last modification time, if the platform reports one
    pub modified: Option<SystemTime>,
    /// Last access time, if the platform reports one
    pub accessed: Option<SystemTime>,
}

impl PathEntry {
    fn from_metadata(path: &Path, meta: &Metadata) -> Self {
        let kind = PathKind::of(meta);
        Self {
            path: path.to_path_buf(),
            kind,
            size: if kind == PathKind::File { meta.len() } else { 0 },
            permissions: meta.permissions(),
            modified: meta.modified().ok(),
            accessed: meta.accessed().ok(),
        }
    }

    /// Unix mode bits.
    #[cfg(unix)]
    #[must_use]
    pub fn mode(&self) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        self.permissions.mode()
    }
}

/// Classify `path`.
///
/// Symlinks are reported as [`PathKind::Symlink`] unless `follow_symlinks`
/// is set, in which case the link is resolved and its target is classified.
///
/// # Errors
///
/// - [`Error::NotFound`] / [`Error::PermissionDenied`] when the path cannot be stat'ed
/// - [`Error::BrokenLink`] when following a link whose target cannot be resolved
/// - [`Error::Io`] for anything else
pub fn classify(path: &Path, follow_symlinks: bool) -> Result<PathEntry> {
    let meta = fs::symlink_metadata(path).map_err(|e| Error::from_io(path, e))?;

    if follow_symlinks && meta.file_type().is_symlink() {
        return match fs::metadata(path) {
            Ok(target) => Ok(PathEntry::from_metadata(path, &target)),
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                Err(Error::PermissionDenied(path.to_path_buf()))
            }
            // Dangling targets and ELOOP both land here
            Err(_) => Err(Error::BrokenLink(path.to_path_buf())),
        };
    }

    Ok(PathEntry::from_metadata(path, &meta))
}
