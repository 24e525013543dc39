//! # copycat
//!
//! Multithreaded file and directory copying driven by a flag bitmask.
//!
//! ## Core Features
//!
//! - **Worker pool**: a fixed number of threads drains the copy plan, with a
//!   dependency gate so no entry is written before its directory exists
//! - **Conflict policies**: overwrite, skip or fail on existing destinations
//! - **Symlink aware**: links are recreated verbatim, or followed on request
//!   with loop detection
//! - **Atomic writes**: files go through a temp file and rename, so a failed
//!   copy leaves no partial destination file
//! - **Per-entry reporting**: one outcome per source entry; a single bad
//!   entry never aborts the rest of the run
//! - **Metadata preserving**: permissions and access/modification times
//!
//! ## Quick Start
//!
//! ```no_run
//! use copycat::{copy, CopyFlags};
//! use std::path::Path;
//!
//! let report = copy(
//!     Path::new("src"),
//!     Path::new("dst"),
//!     4,
//!     CopyFlags::RECURSIVE | CopyFlags::OVERWRITE,
//! )?;
//! println!("copied {} entries ({} bytes)", report.succeeded, report.bytes_copied);
//! # Ok::<(), copycat::Error>(())
//! ```
//!
//! ## Builder API
//!
//! ```no_run
//! use copycat::CopyBuilder;
//!
//! let report = CopyBuilder::new("project", "backup")
//!     .recursive()
//!     .skip_existing()
//!     .threads(16)
//!     .run()?;
//! # Ok::<(), copycat::Error>(())
//! ```
//!
//! ## Flags
//!
//! | Flag | Bit | Effect |
//! |------|-----|--------|
//! | `NONE` | `1 << 0` | Explicit "no flags" marker |
//! | `OVERWRITE` | `1 << 1` | Replace existing destinations |
//! | `RECURSIVE` | `1 << 2` | Descend into directories |
//! | `SKIP_EXISTING` | `1 << 3` | Leave existing destinations alone |
//! | `NO_OVERWRITE` | `1 << 4` | Fail on existing destinations |
//! | `FOLLOW_SYMLINKS` | `1 << 5` | Copy link targets instead of links |
//!
//! When several conflict flags are set, `SKIP_EXISTING` wins over
//! `NO_OVERWRITE`, which wins over `OVERWRITE`. `OVERWRITE | NO_OVERWRITE`
//! is rejected. With none of them set an existing destination fails the task.
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: `debug` per task, `info` per run and
//! `warn` for failures. Install a subscriber to see them.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | Progress bar support with indicatif |
//! | `serde` | `Serialize` for reports and policies |
//! | `reflink` | Copy-on-write clones on btrfs/XFS/APFS |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod classify;
mod conflict;
mod copy;
mod error;
mod flags;
mod options;
mod plan;
mod report;

#[cfg(feature = "progress")]
mod progress;

pub use builder::CopyBuilder;
pub use classify::{PathEntry, PathKind, classify};
pub use conflict::{Disposition, probe, probe_task, resolve};
pub use copy::{copy, copy_with_options};
pub use error::{Error, Result, TaskError, is_no_space_error};
pub use flags::{ConflictPolicy, CopyFlags, CopyPolicy};
pub use options::{CopyOptions, ProgressCallback};
pub use plan::{CopyTask, Plan, TaskKind, plan};
pub use report::{CopyReport, SkipReason, TaskOutcome, TaskRecord};

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::{create_progress_bar, progress_callback};
