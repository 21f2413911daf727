/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Execution substrate: spawning executors and moving them between
//! priority levels.
//!
//! The Scheduler Core only talks to the [`Substrate`] trait.
//! [`TokioSubstrate`] is the runtime implementation: one tokio task per
//! executor, the executor's priority published on a `watch` channel, and
//! `terminate` aborting the task outright (no graceful shutdown phase).

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::clock::TickClock;
use crate::executor::{run_executor, ExecutorJob};
use crate::message::Message;
use crate::task::{ExecutorHandle, TaskId};

// ── Priority ──────────────────────────────────────────────────────────────────

/// The five fixed priority levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Spawned executors waiting for the running slot.
    Pending,
    SchedulerLoop,
    GeneratorLoop,
    /// Held by at most one executor: the head of the active list.
    Running,
    ReporterLoop,
}

impl Priority {
    /// Numeric level.
    pub fn level(self) -> u8 {
        match self {
            Priority::Pending => 0,
            Priority::SchedulerLoop => 1,
            Priority::GeneratorLoop => 2,
            Priority::Running => 3,
            Priority::ReporterLoop => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Priority::Pending => "pending",
            Priority::SchedulerLoop => "scheduler-loop",
            Priority::GeneratorLoop => "generator-loop",
            Priority::Running => "running",
            Priority::ReporterLoop => "reporter-loop",
        };
        write!(f, "{name}({})", self.level())
    }
}

// ── Substrate trait ───────────────────────────────────────────────────────────

/// Capabilities the Scheduler Core needs from the execution substrate.
pub trait Substrate {
    /// Start an executor for `job` at `priority`.
    fn spawn(&mut self, job: ExecutorJob, priority: Priority) -> ExecutorHandle;

    /// Move an executor to `priority`.  Unknown or finished handles are
    /// ignored.
    fn set_priority(&mut self, handle: ExecutorHandle, priority: Priority);

    /// Stop an executor immediately.  Unknown or finished handles are
    /// ignored.
    fn terminate(&mut self, handle: ExecutorHandle);
}

// ── TokioSubstrate ────────────────────────────────────────────────────────────

struct ExecutorSlot {
    task_id: TaskId,
    priority: watch::Sender<Priority>,
    join: JoinHandle<()>,
}

/// Tokio-task substrate.
///
/// Must be used from inside a tokio runtime.  Executors receive a clone of
/// the control channel sender so they can report `Complete`.
pub struct TokioSubstrate {
    control: mpsc::Sender<Message>,
    clock: TickClock,
    wait_bound: Duration,
    next_handle: u64,
    executors: HashMap<ExecutorHandle, ExecutorSlot>,
}

impl TokioSubstrate {
    pub fn new(control: mpsc::Sender<Message>, clock: TickClock, wait_bound: Duration) -> Self {
        Self {
            control,
            clock,
            wait_bound,
            next_handle: 0,
            executors: HashMap::new(),
        }
    }

    /// Number of executors that have not finished or been terminated.
    pub fn live_executors(&self) -> usize {
        self.executors
            .values()
            .filter(|slot| !slot.join.is_finished())
            .count()
    }

    /// Current priority of a live executor.
    pub fn priority_of(&self, handle: ExecutorHandle) -> Option<Priority> {
        self.executors
            .get(&handle)
            .filter(|slot| !slot.join.is_finished())
            .map(|slot| *slot.priority.borrow())
    }

    /// Drop bookkeeping for executors that already reported and exited.
    fn reap_finished(&mut self) {
        self.executors.retain(|handle, slot| {
            let keep = !slot.join.is_finished();
            if !keep {
                trace!(%handle, task_id = slot.task_id, "reaped finished executor");
            }
            keep
        });
    }
}

impl Substrate for TokioSubstrate {
    fn spawn(&mut self, job: ExecutorJob, priority: Priority) -> ExecutorHandle {
        self.reap_finished();

        let handle = ExecutorHandle(self.next_handle);
        self.next_handle += 1;

        let (priority_tx, priority_rx) = watch::channel(priority);
        let join = tokio::spawn(run_executor(
            job,
            priority_rx,
            self.clock.clone(),
            self.control.clone(),
            self.wait_bound,
        ));

        debug!(%handle, task_id = job.task_id, %priority, "executor spawned");
        self.executors.insert(
            handle,
            ExecutorSlot {
                task_id: job.task_id,
                priority: priority_tx,
                join,
            },
        );
        handle
    }

    fn set_priority(&mut self, handle: ExecutorHandle, priority: Priority) {
        match self.executors.get(&handle) {
            Some(slot) => {
                let changed = slot.priority.send_if_modified(|current| {
                    if *current == priority {
                        false
                    } else {
                        *current = priority;
                        true
                    }
                });
                if changed {
                    trace!(%handle, task_id = slot.task_id, %priority, "priority set");
                }
            }
            None => trace!(%handle, %priority, "set_priority on unknown executor ignored"),
        }
    }

    fn terminate(&mut self, handle: ExecutorHandle) {
        if let Some(slot) = self.executors.remove(&handle) {
            slot.join.abort();
            debug!(%handle, task_id = slot.task_id, "executor terminated");
        }
    }
}

// ── Recording substrate (tests) ───────────────────────────────────────────────
