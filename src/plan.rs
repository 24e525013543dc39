//! Traversal planning.
//!
//! [`plan`] walks the source and turns every reachable entry into either a
//! queued [`CopyTask`] or an outcome decided on the spot (unsupported kinds,
//! broken links, symlink loops, unreadable directories). It reads the source
//! tree only; the destination is inspected once to decide where a single
//! file lands, and nothing is written.
//!
//! # Ordering
//!
//! Entries are visited depth-first with siblings sorted by name. A
//! directory's [`TaskKind::CreateDirectory`] task is pushed before any task
//! inside it, and every task records the index of that directory task as
//! its `parent`. The scheduler uses `parent` as a dependency gate.

use crate::classify::{PathEntry, PathKind, classify};
use crate::copy::utils::dir_key;
use crate::error::{Error, Result, TaskError};
use crate::flags::CopyPolicy;
use crate::report::{SkipReason, TaskOutcome, TaskRecord};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// What a task does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TaskKind {
    /// Create the destination directory (and missing ancestors)
    CreateDirectory,
    /// Stream a file's bytes
    CopyFile,
    /// Recreate a symlink with the same target string
    RecreateSymlink,
}

/// One unit of copy work.
#[derive(Debug, Clone)]
pub struct CopyTask {
    /// Classified source entry
    pub entry: PathEntry,
    /// Where the entry is reproduced
    pub destination: PathBuf,
    /// What to do
    pub kind: TaskKind,
    /// Index (into [`Plan::tasks`]) of the directory task this one depends on
    pub parent: Option<usize>,
    /// Discovery order across tasks and settled entries
    pub(crate) seq: usize,
}

/// An entry whose outcome was decided during planning.
#[derive(Debug, Clone)]
pub(crate) struct Settled {
    pub(crate) seq: usize,
    pub(crate) record: TaskRecord,
}

/// Output of [`plan`].
#[derive(Debug, Clone, Default)]
pub struct Plan {
    tasks: Vec<CopyTask>,
    settled: Vec<Settled>,
}

impl Plan {
    /// Tasks to execute, ancestors before descendants.
    #[must_use]
    pub fn tasks(&self) -> &[CopyTask] {
        &self.tasks
    }

    /// Records decided at planning time (not queued).
    pub fn settled(&self) -> impl Iterator<Item = &TaskRecord> {
        self.settled.iter().map(|s| &s.record)
    }

    /// Number of source entries covered by the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len() + self.settled.len()
    }

    /// True when the plan covers nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn into_parts(self) -> (Vec<CopyTask>, Vec<Settled>) {
        (self.tasks, self.settled)
    }
}

/// Build the plan for copying `source` to `destination`.
///
/// - A file or symlink source becomes a single task. If `destination` is an
///   existing directory the entry lands inside it under its own name,
///   otherwise `destination` names the new entry.
/// - A directory source requires `policy.recursive`; `destination` then
///   becomes the root of the mirrored tree.
///
/// # Errors
///
/// Only problems with the source root abort planning:
/// [`Error::NotFound`], [`Error::PermissionDenied`], [`Error::BrokenLink`],
/// [`Error::IsADirectory`], and [`Error::Io`] if the root directory cannot
/// be listed. Problems with nested entries become per-entry outcomes.
pub fn plan(source: &Path, destination: &Path, policy: &CopyPolicy) -> Result<Plan> {
    let root = classify(source, policy.follow_symlinks)?;
    let mut planner = Planner {
        plan: Plan::default(),
        follow_symlinks: policy.follow_symlinks,
        ancestors: Vec::new(),
        seq: 0,
    };

    match root.kind {
        PathKind::File | PathKind::Symlink => {
            let dst = single_entry_destination(source, destination);
            planner.push_task(root, dst, None);
        }
        PathKind::Directory => {
            if !policy.recursive {
                return Err(Error::IsADirectory(source.to_path_buf()));
            }
            let names = list_dir(&root.path).map_err(|e| Error::from_io(source, e))?;
            let key = planner.loop_key(&root.path);
            planner.push_dir(root, destination.to_path_buf(), names, None, key);
        }
        PathKind::Unsupported => {
            let dst = single_entry_destination(source, destination);
            planner.settle(&root, dst, TaskOutcome::Skipped(SkipReason::UnsupportedKind));
        }
    }

    tracing::debug!(
        source = %source.display(),
        tasks = planner.plan.tasks.len(),
        settled = planner.plan.settled.len(),
        "planned copy"
    );

    Ok(planner.plan)
}

fn single_entry_destination(source: &Path, destination: &Path) -> PathBuf {
    match source.file_name() {
        Some(name) if destination.is_dir() => destination.join(name),
        _ => destination.to_path_buf(),
    }
}

/// Child names of `dir`, sorted.
fn list_dir(dir: &Path) -> std::io::Result<Vec<OsString>> {
    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<std::io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

struct Planner {
    plan: Plan,
    follow_symlinks: bool,
    /// Identities of the directories currently being descended
    ancestors: Vec<(u64, u64)>,
    seq: usize,
}

impl Planner {
    /// Only followed links can create cycles, so keys are taken only then.
    fn loop_key(&self, dir: &Path) -> Option<(u64, u64)> {
        if self.follow_symlinks {
            dir_key(dir).ok()
        } else {
            None
        }
    }

    fn next_seq(&mut self) -> usize {
        let seq = self.seq;
        self.seq += 1;
        seq
    }

    fn push_task(
        &mut self,
        entry: PathEntry,
        destination: PathBuf,
        parent: Option<usize>,
    ) -> usize {
        let kind = match entry.kind {
            PathKind::Directory => TaskKind::CreateDirectory,
            PathKind::Symlink => TaskKind::RecreateSymlink,
            _ => TaskKind::CopyFile,
        };
        let seq = self.next_seq();
        self.plan.tasks.push(CopyTask {
            entry,
            destination,
            kind,
            parent,
            seq,
        });
        self.plan.tasks.len() - 1
    }

    fn settle(&mut self, entry: &PathEntry, destination: PathBuf, outcome: TaskOutcome) {
        let seq = self.next_seq();
        self.plan.settled.push(Settled {
            seq,
            record: TaskRecord {
                source: entry.path.clone(),
                destination,
                kind: entry.kind,
                outcome,
            },
        });
    }

    /// Queue a directory whose listing is already known, then its children.
    fn push_dir(
        &mut self,
        entry: PathEntry,
        destination: PathBuf,
        names: Vec<OsString>,
        parent: Option<usize>,
        key: Option<(u64, u64)>,
    ) {
        let src = entry.path.clone();
        let id = self.push_task(entry, destination.clone(), parent);

        if let Some(key) = key {
            self.ancestors.push(key);
        }
        for name in names {
            self.visit(src.join(&name), destination.join(&name), id);
        }
        if key.is_some() {
            self.ancestors.pop();
        }
    }

    fn visit(&mut self, src: PathBuf, dst: PathBuf, parent: usize) {
        let entry = match classify(&src, self.follow_symlinks) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %src.display(), error = %e, "cannot classify entry");
                let error = match e {
                    Error::BrokenLink(path) => TaskError::BrokenLink(path),
                    other => TaskError::IoFailure {
                        path: src.clone(),
                        detail: other.to_string(),
                    },
                };
                let kind = fs::symlink_metadata(&src)
                    .map(|m| PathKind::of(&m))
                    .unwrap_or(PathKind::Unsupported);
                let seq = self.next_seq();
                self.plan.settled.push(Settled {
                    seq,
                    record: TaskRecord {
                        source: src,
                        destination: dst,
                        kind,
                        outcome: TaskOutcome::Failed(error),
                    },
                });
                return;
            }
        };

        match entry.kind {
            PathKind::File | PathKind::Symlink => {
                self.push_task(entry, dst, Some(parent));
            }
            PathKind::Directory => {
                let key = self.loop_key(&src);
                if key.is_some_and(|k| self.ancestors.contains(&k)) {
                    tracing::warn!(path = %src.display(), "symlink loop detected");
                    let loop_err = TaskError::SymlinkLoop(src);
                    self.settle(&entry, dst, TaskOutcome::Failed(loop_err));
                    return;
                }
                match list_dir(&src) {
                    Ok(names) => self.push_dir(entry, dst, names, Some(parent), key),
                    Err(e) => {
                        tracing::warn!(path = %src.display(), error = %e, "cannot list directory");
                        let failure = TaskOutcome::Failed(TaskError::io(&src, &e));
                        self.settle(&entry, dst, failure);
                    }
                }
            }
            PathKind::Unsupported => {
                tracing::debug!(path = %src.display(), "skipping special file");
                self.settle(&entry, dst, TaskOutcome::Skipped(SkipReason::UnsupportedKind));
            }
        }
    }
}
