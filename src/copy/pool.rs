//! Worker pool and dependency gate.
//!
//! Every task runs on a dedicated rayon pool of exactly `threads` workers.
//! Root tasks are spawned up front; a directory's children are spawned only
//! once its `CreateDirectory` task has succeeded, so no worker ever writes
//! into a directory that does not exist yet. If a directory is skipped or
//! fails, its whole subtree is settled without touching the filesystem.
//!
//! Outcomes are collected per task index and reassembled in planning order
//! after the pool drains. Directory metadata is applied last, deepest first,
//! so read-only directories do not block writes into themselves.

use crate::conflict::{Disposition, probe_task, resolve};
use crate::error::{Result, TaskError};
use crate::options::CopyOptions;
use crate::plan::{CopyTask, Plan, TaskKind};
use crate::report::{SkipReason, TaskOutcome, TaskRecord};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use super::exec::{execute, finish_directory};

/// Execute `plan` and return one record per planned entry, in planning order.
///
/// # Errors
///
/// Fails only if the worker pool cannot be started.
pub(crate) fn run(plan: Plan, options: &CopyOptions) -> Result<Vec<TaskRecord>> {
    let (tasks, settled) = plan.into_parts();

    let mut children = vec![Vec::new(); tasks.len()];
    let mut roots = Vec::new();
    for (id, task) in tasks.iter().enumerate() {
        match task.parent {
            Some(parent) => children[parent].push(id),
            None => roots.push(id),
        }
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads)
        .thread_name(|i| format!("copycat-worker-{i}"))
        .build()?;

    tracing::debug!(
        threads = options.threads,
        tasks = tasks.len(),
        settled = settled.len(),
        "starting workers"
    );

    let scheduler = Scheduler {
        tasks: &tasks,
        children: &children,
        options,
        outcomes: Mutex::new(vec![None; tasks.len()]),
        done: AtomicU64::new(settled.len() as u64),
        total: (tasks.len() + settled.len()) as u64,
    };

    pool.scope(|scope| {
        for &root in &roots {
            scheduler.dispatch(scope, root);
        }
    });

    let outcomes = scheduler
        .outcomes
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);

    // Reverse planning order visits descendants before their ancestors
    for (task, outcome) in tasks.iter().zip(&outcomes).rev() {
        if task.kind == TaskKind::CreateDirectory
            && outcome.as_ref().is_some_and(TaskOutcome::is_success)
        {
            finish_directory(task, options);
        }
    }

    let mut records: Vec<(usize, TaskRecord)> = tasks
        .into_iter()
        .zip(outcomes)
        .map(|(task, outcome)| {
            let outcome = outcome.unwrap_or_else(|| {
                TaskOutcome::Failed(TaskError::IoFailure {
                    path: task.entry.path.clone(),
                    detail: "task was never executed".to_string(),
                })
            });
            (
                task.seq,
                TaskRecord {
                    source: task.entry.path,
                    destination: task.destination,
                    kind: task.entry.kind,
                    outcome,
                },
            )
        })
        .chain(settled.into_iter().map(|s| (s.seq, s.record)))
        .collect();
    records.sort_by_key(|(seq, _)| *seq);

    Ok(records.into_iter().map(|(_, record)| record).collect())
}

struct Scheduler<'a> {
    tasks: &'a [CopyTask],
    children: &'a [Vec<usize>],
    options: &'a CopyOptions,
    outcomes: Mutex<Vec<Option<TaskOutcome>>>,
    done: AtomicU64,
    total: u64,
}

impl Scheduler<'_> {
    fn dispatch<'s>(&'s self, scope: &rayon::Scope<'s>, id: usize) {
        scope.spawn(move |scope| {
            let outcome = self.run_task(id);
            let cascade = match &outcome {
                TaskOutcome::Success { .. } => None,
                TaskOutcome::Skipped(_) => Some(TaskOutcome::Skipped(SkipReason::ParentSkipped)),
                TaskOutcome::Failed(_) => Some(TaskOutcome::Failed(
                    TaskError::ParentUnavailable(self.tasks[id].destination.clone()),
                )),
            };
            self.record(id, outcome);

            match cascade {
                None => {
                    for &child in &self.children[id] {
                        self.dispatch(scope, child);
                    }
                }
                Some(cascade) => self.settle_subtree(id, &cascade),
            }
        });
    }

    fn run_task(&self, id: usize) -> TaskOutcome {
        let task = &self.tasks[id];
        let existing = match probe_task(task) {
            Ok(existing) => existing,
            Err(e) => return TaskOutcome::Failed(e),
        };

        match resolve(task, existing, self.options.policy.conflict()) {
            Disposition::Proceed => execute(task, false, self.options),
            Disposition::Replace => execute(task, true, self.options),
            Disposition::Skip(reason) => TaskOutcome::Skipped(reason),
            Disposition::Fail(e) => TaskOutcome::Failed(e),
        }
    }

    fn settle_subtree(&self, id: usize, outcome: &TaskOutcome) {
        let mut stack: Vec<usize> = self.children[id].clone();
        while let Some(child) = stack.pop() {
            stack.extend_from_slice(&self.children[child]);
            self.record(child, outcome.clone());
        }
    }

    fn record(&self, id: usize, outcome: TaskOutcome) {
        let task = &self.tasks[id];
        match &outcome {
            TaskOutcome::Success { bytes } => tracing::debug!(
                source = %task.entry.path.display(),
                destination = %task.destination.display(),
                bytes,
                "copied"
            ),
            TaskOutcome::Skipped(reason) => tracing::debug!(
                source = %task.entry.path.display(),
                ?reason,
                "skipped"
            ),
            TaskOutcome::Failed(e) => tracing::warn!(
                source = %task.entry.path.display(),
                error = %e,
                "task failed"
            ),
        }

        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)[id] = Some(outcome);

        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(progress) = &self.options.progress {
            progress(done, self.total);
        }
    }
}
