/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! The short-lived execution unit spawned for every admitted task.
//!
//! An executor occupies the (single, simulated) CPU for its task's
//! `execution_time` ticks and then reports `Complete` on the control
//! channel.  CPU time is only consumed while the executor holds the
//! [`Priority::Running`] slot: a demotion suspends it and keeps the unspent
//! part of the budget for the next promotion.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::channel::send_bounded;
use crate::clock::{Clock, TickClock};
use crate::message::Message;
use crate::substrate::Priority;
use crate::task::{Task, TaskId, Tick};

/// What an executor needs to know about its task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorJob {
    pub task_id: TaskId,
    pub execution_time: Tick,
}

impl From<&Task> for ExecutorJob {
    fn from(task: &Task) -> Self {
        Self {
            task_id: task.task_id,
            execution_time: task.execution_time,
        }
    }
}

/// Executor entry point.
///
/// Runs the job's budget, then sends `Complete(task_id, now)` with a bounded
/// wait.  A send failure is logged and the completion is lost.  Returns
/// early, without reporting, if the priority channel is dropped (the
/// executor was terminated).
pub async fn run_executor(
    job: ExecutorJob,
    mut priority: watch::Receiver<Priority>,
    clock: TickClock,
    control: mpsc::Sender<Message>,
    wait_bound: Duration,
) {
    debug!(task_id = job.task_id, budget = job.execution_time, "executor started");

    if !consume_budget(job, &mut priority, &clock).await {
        debug!(task_id = job.task_id, "executor cut off before finishing");
        return;
    }

    let completion_time = clock.now();
    let msg = Message::Complete {
        task_id: job.task_id,
        completion_time,
    };
    match send_bounded(&control, msg, wait_bound).await {
        Ok(()) => debug!(task_id = job.task_id, completion_time, "executor finished"),
        Err(e) => warn!(task_id = job.task_id, error = %e, "completion not delivered"),
    }
}

/// Spend `job.execution_time` ticks of running-slot time.
///
/// Returns `false` if the priority sender went away first.
async fn consume_budget(
    job: ExecutorJob,
    priority: &mut watch::Receiver<Priority>,
    clock: &TickClock,
) -> bool {
    let mut remaining = clock.ticks(job.execution_time);

    while !remaining.is_zero() {
        if priority.wait_for(|p| *p == Priority::Running).await.is_err() {
            return false;
        }

        let slice_start = Instant::now();
        tokio::select! {
            _ = tokio::time::sleep(remaining) => {
                remaining = Duration::ZERO;
            }
            changed = priority.changed() => {
                remaining = remaining.saturating_sub(slice_start.elapsed());
                if changed.is_err() {
                    return false;
                }
                trace!(task_id = job.task_id, remaining = ?remaining, "executor preempted");
            }
        }
    }

    true
}
