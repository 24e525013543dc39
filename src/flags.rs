//! Copy flags and the policy decoded from them.
//!
//! [`CopyFlags`] is the raw bitmask exchanged with foreign callers. Inside the
//! crate everything works on [`CopyPolicy`], which names each toggle and has
//! already been validated.
//!
//! # Example
//!
//! ```
//! use copycat::{CopyFlags, CopyPolicy, ConflictPolicy};
//!
//! let policy = CopyPolicy::try_from(CopyFlags::RECURSIVE | CopyFlags::SKIP_EXISTING)?;
//! assert!(policy.recursive);
//! assert_eq!(policy.conflict(), ConflictPolicy::Skip);
//! # Ok::<(), copycat::Error>(())
//! ```

use crate::error::{Error, Result};

bitflags::bitflags! {
    /// Raw copy flags, as passed across a foreign-function boundary.
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct CopyFlags: u32 {
        /// Explicit "no flags" marker. Carries no policy.
        const NONE = 1 << 0;
        /// Replace destination entries that already exist.
        const OVERWRITE = 1 << 1;
        /// Descend into directories.
        const RECURSIVE = 1 << 2;
        /// Leave existing destination entries untouched and report them skipped.
        const SKIP_EXISTING = 1 << 3;
        /// Fail tasks whose destination already exists.
        const NO_OVERWRITE = 1 << 4;
        /// Copy what symlinks point to instead of the links themselves.
        const FOLLOW_SYMLINKS = 1 << 5;
    }
}

/// What to do when a task's destination is already occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConflictPolicy {
    /// Fail the task with `DestinationExists` (default, never clobbers).
    #[default]
    Fail,
    /// Keep the existing entry and report the task skipped.
    Skip,
    /// Replace the existing entry.
    Overwrite,
}

/// Validated, named form of [`CopyFlags`].
///
/// Immutable once decoded; shared read-only with every worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct CopyPolicy {
    /// Descend into directories
    pub recursive: bool,
    /// Replace existing destination entries
    pub overwrite: bool,
    /// Skip existing destination entries
    pub skip_existing: bool,
    /// Fail on existing destination entries
    pub no_overwrite: bool,
    /// Dereference symlinks
    pub follow_symlinks: bool,
}

impl CopyPolicy {
    /// Decode a raw bitmask.
    ///
    /// Unknown bits are dropped with a warning. `NONE` is accepted and ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFlags`] when `OVERWRITE` and `NO_OVERWRITE`
    /// are both set.
    pub fn decode(bits: u32) -> Result<Self> {
        let flags = CopyFlags::from_bits_truncate(bits);
        if flags.bits() != bits {
            tracing::warn!(
                bits = format_args!("{bits:#x}"),
                unknown = format_args!("{:#x}", bits & !CopyFlags::all().bits()),
                "ignoring unknown copy flag bits"
            );
        }
        Self::try_from(flags)
    }

    /// Re-encode into the raw bitmask. Never sets `NONE`.
    #[must_use]
    pub fn to_flags(&self) -> CopyFlags {
        let mut flags = CopyFlags::empty();
        flags.set(CopyFlags::RECURSIVE, self.recursive);
        flags.set(CopyFlags::OVERWRITE, self.overwrite);
        flags.set(CopyFlags::SKIP_EXISTING, self.skip_existing);
        flags.set(CopyFlags::NO_OVERWRITE, self.no_overwrite);
        flags.set(CopyFlags::FOLLOW_SYMLINKS, self.follow_symlinks);
        flags
    }

    /// Effective conflict behavior.
    ///
    /// `skip_existing` wins over `no_overwrite`, which wins over `overwrite`.
    /// With none of them set the policy fails closed.
    #[must_use]
    pub fn conflict(&self) -> ConflictPolicy {
        if self.skip_existing {
            ConflictPolicy::Skip
        } else if self.no_overwrite {
            ConflictPolicy::Fail
        } else if self.overwrite {
            ConflictPolicy::Overwrite
        } else {
            ConflictPolicy::Fail
        }
    }
}

impl TryFrom<CopyFlags> for CopyPolicy {
    type Error = Error;

    fn try_from(flags: CopyFlags) -> Result<Self> {
        if flags.contains(CopyFlags::OVERWRITE | CopyFlags::NO_OVERWRITE) {
            return Err(Error::InvalidFlags { bits: flags.bits() });
        }

        Ok(Self {
            recursive: flags.contains(CopyFlags::RECURSIVE),
            overwrite: flags.contains(CopyFlags::OVERWRITE),
            skip_existing: flags.contains(CopyFlags::SKIP_EXISTING),
            no_overwrite: flags.contains(CopyFlags::NO_OVERWRITE),
            follow_symlinks: flags.contains(CopyFlags::FOLLOW_SYMLINKS),
        })
    }
}

impl From<CopyPolicy> for CopyFlags {
    fn from(policy: CopyPolicy) -> Self {
        policy.to_flags()
    }
}
