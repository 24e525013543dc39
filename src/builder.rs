//! Builder API for ergonomic copy calls.
//!
//! The builder accumulates [`CopyFlags`] bit by bit and decodes them only in
//! [`CopyBuilder::run`], so contradictory combinations surface as
//! [`Error::InvalidFlags`](crate::Error::InvalidFlags) exactly as they would
//! through [`copy`](crate::copy).
//!
//! # Examples
//!
//! ## Mirror a tree
//!
//! ```no_run
//! use copycat::CopyBuilder;
//!
//! let report = CopyBuilder::new("src", "dst")
//!     .recursive()
//!     .threads(8)
//!     .run()?;
//! println!("{} entries copied", report.succeeded);
//! # Ok::<(), copycat::Error>(())
//! ```
//!
//! ## Resume an interrupted copy
//!
//! ```no_run
//! use copycat::CopyBuilder;
//!
//! let report = CopyBuilder::new("dataset", "/mnt/backup/dataset")
//!     .recursive()
//!     .skip_existing()
//!     .no_fsync()
//!     .run()?;
//! println!("{} already present", report.skipped);
//! # Ok::<(), copycat::Error>(())
//! ```

use crate::copy::copy_with_options;
use crate::error::Result;
use crate::flags::CopyFlags;
use crate::options::{CopyOptions, ProgressCallback, default_threads};
use crate::report::CopyReport;
use std::fmt;
use std::path::{Path, PathBuf};

/// A builder for configuring and executing a copy.
///
/// # Example
///
/// ```no_run
/// use copycat::CopyBuilder;
///
/// let report = CopyBuilder::new("/data/project", "/backup/project")
///     .recursive()
///     .overwrite()
///     .follow_symlinks()
///     .run()?;
/// # Ok::<(), copycat::Error>(())
/// ```
#[derive(Clone)]
pub struct CopyBuilder {
    src: PathBuf,
    dst: PathBuf,
    flags: CopyFlags,
    threads: usize,
    preserve_metadata: bool,
    fsync: bool,
    progress: Option<ProgressCallback>,
}

impl fmt::Debug for CopyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyBuilder")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("flags", &self.flags)
            .field("threads", &self.threads)
            .field("preserve_metadata", &self.preserve_metadata)
            .field("fsync", &self.fsync)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl CopyBuilder {
    /// Create a builder with no flags set, one worker per CPU, metadata
    /// preservation and fsync on.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
            flags: CopyFlags::empty(),
            threads: default_threads(),
            preserve_metadata: true,
            fsync: true,
            progress: None,
        }
    }

    /// Set the number of worker threads.
    ///
    /// Zero is accepted here and rejected by [`run`](Self::run).
    #[must_use]
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Descend into directories.
    #[must_use]
    pub fn recursive(mut self) -> Self {
        self.flags |= CopyFlags::RECURSIVE;
        self
    }

    /// Replace existing destination entries.
    #[must_use]
    pub fn overwrite(mut self) -> Self {
        self.flags |= CopyFlags::OVERWRITE;
        self
    }

    /// Leave existing destination entries untouched and report them skipped.
    #[must_use]
    pub fn skip_existing(mut self) -> Self {
        self.flags |= CopyFlags::SKIP_EXISTING;
        self
    }

    /// Fail tasks whose destination already exists.
    #[must_use]
    pub fn no_overwrite(mut self) -> Self {
        self.flags |= CopyFlags::NO_OVERWRITE;
        self
    }

    /// Copy what symlinks point to instead of the links themselves.
    #[must_use]
    pub fn follow_symlinks(mut self) -> Self {
        self.flags |= CopyFlags::FOLLOW_SYMLINKS;
        self
    }

    /// Add raw flag bits.
    #[must_use]
    pub fn flags(mut self, flags: CopyFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Do not propagate permissions or timestamps.
    #[must_use]
    pub fn no_metadata(mut self) -> Self {
        self.preserve_metadata = false;
        self
    }

    /// Skip fsync before renaming files into place.
    #[must_use]
    pub fn no_fsync(mut self) -> Self {
        self.fsync = false;
        self
    }

    /// Install a `(done, total)` progress hook.
    #[must_use]
    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Flags accumulated so far.
    #[must_use]
    pub fn current_flags(&self) -> CopyFlags {
        self.flags
    }

    /// Decode the flags and run the copy.
    ///
    /// # Errors
    ///
    /// See [`copy`](crate::copy).
    pub fn run(self) -> Result<CopyReport> {
        let mut options = CopyOptions::from_flags(self.flags)?.with_threads(self.threads);
        options.preserve_metadata = self.preserve_metadata;
        options.fsync = self.fsync;
        options.progress = self.progress;
        copy_with_options(&self.src, &self.dst, &options)
    }
}
