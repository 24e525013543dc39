//! Configuration options for copy operations.
//!
//! This module provides [`CopyOptions`], the Rust-side configuration of a
//! copy call. The foreign-call shape (`threads` + raw [`CopyFlags`]) maps onto
//! it through [`CopyOptions::from_flags`].
//!
//! # Example
//!
//! ```
//! use copycat::{CopyFlags, CopyOptions};
//!
//! let options = CopyOptions::from_flags(CopyFlags::RECURSIVE | CopyFlags::OVERWRITE)?
//!     .with_threads(8)
//!     .without_fsync();
//! assert_eq!(options.threads, 8);
//! # Ok::<(), copycat::Error>(())
//! ```

use crate::error::Result;
use crate::flags::{CopyFlags, CopyPolicy};
use std::fmt;
use std::sync::Arc;

/// Callback for progress updates: `(finished, total)` task counts.
///
/// Invoked from worker threads after each outcome is recorded.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Options for copy operations.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `threads` | available parallelism | Worker threads |
/// | `policy` | no flags | Non-recursive, fail on conflict, keep symlinks |
/// | `preserve_metadata` | `true` | Copy permissions and timestamps |
/// | `fsync` | `true` | Sync file data before the final rename |
#[derive(Clone)]
pub struct CopyOptions {
    /// Number of worker threads (must be at least 1 when a copy runs)
    pub threads: usize,

    /// Decoded flag policy
    pub policy: CopyPolicy,

    /// Propagate permission bits and access/modification times
    pub preserve_metadata: bool,

    /// Whether to sync files to disk before they are renamed into place
    pub fsync: bool,

    /// Progress hook (optional)
    pub progress: Option<ProgressCallback>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            threads: default_threads(),
            policy: CopyPolicy::default(),
            preserve_metadata: true,
            fsync: true,
            progress: None,
        }
    }
}

impl fmt::Debug for CopyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyOptions")
            .field("threads", &self.threads)
            .field("policy", &self.policy)
            .field("preserve_metadata", &self.preserve_metadata)
            .field("fsync", &self.fsync)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Hardware parallelism, or 1 when it cannot be determined.
pub(crate) fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

impl CopyOptions {
    /// Default options with the policy decoded from `flags`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFlags`](crate::Error::InvalidFlags) for
    /// contradictory flags.
    pub fn from_flags(flags: CopyFlags) -> Result<Self> {
        Ok(Self {
            policy: CopyPolicy::try_from(flags)?,
            ..Self::default()
        })
    }

    /// Set the number of worker threads
    ///
    /// Zero is kept as given and rejected when the copy runs.
    #[must_use]
    pub fn with_threads(mut self, n: usize) -> Self {
        self.threads = n;
        self
    }

    /// Replace the flag policy
    #[must_use]
    pub fn with_policy(mut self, policy: CopyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Disable fsync for faster (but less durable) copies
    #[must_use]
    pub fn without_fsync(mut self) -> Self {
        self.fsync = false;
        self
    }

    /// Do not propagate permissions or timestamps
    #[must_use]
    pub fn without_metadata(mut self) -> Self {
        self.preserve_metadata = false;
        self
    }

    /// Install a progress hook
    #[must_use]
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }
}
