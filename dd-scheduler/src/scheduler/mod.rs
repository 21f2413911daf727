//! Scheduler Core: Earliest-Deadline-First admission, ordering and eviction.
//!
//! [`DeadlineScheduler`] owns the three task lists and is the only code that
//! mutates them.  It is driven by one message at a time, either directly
//! through [`handle`](DeadlineScheduler::handle) or by the async control loop
//! [`run`](DeadlineScheduler::run), which is the single consumer of the
//! control channel.  Serialising every mutation through that loop is what
//! keeps the lists consistent without locks.
//!
//! # Running slot
//! Exactly one executor holds [`Priority::Running`] whenever the active list
//! is non-empty: the executor of the active-list head.  Every other admitted
//! executor sits at [`Priority::Pending`].
//!
//! # Release
//! 1. Demote the current head to pending.
//! 2. Spawn the new task's executor at pending.
//! 3. Insert by deadline.
//! 4. Evict unschedulable heads to the overdue list (terminating their
//!    executors).
//! 5. Promote the resulting head to running.
//!
//! # Example
//! ```rust,ignore
//! let mut core = DeadlineScheduler::new(substrate, clock.clone());
//! core.handle(Message::Release(task));
//! let snapshot = core.snapshot(ListKind::Active);
//! ```

pub mod feasibility;
pub mod list;

pub use list::TaskList;

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::channel::{recv_bounded, send_bounded, ChannelError};
use crate::clock::Clock;
use crate::executor::ExecutorJob;
use crate::message::{ListKind, ListSnapshot, Message};
use crate::substrate::{Priority, Substrate};
use crate::task::{Task, TaskId, Tick};

// ── DeadlineScheduler ─────────────────────────────────────────────────────────

pub struct DeadlineScheduler<S, C> {
    substrate: S,
    clock: C,
    active: TaskList,
    completed: TaskList,
    overdue: TaskList,
}

impl<S: Substrate, C: Clock> DeadlineScheduler<S, C> {
    pub fn new(substrate: S, clock: C) -> Self {
        Self {
            substrate,
            clock,
            active: TaskList::new(),
            completed: TaskList::new(),
            overdue: TaskList::new(),
        }
    }

    pub fn active(&self) -> &TaskList {
        &self.active
    }

    pub fn completed(&self) -> &TaskList {
        &self.completed
    }

    pub fn overdue(&self) -> &TaskList {
        &self.overdue
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    /// Process one control message.
    ///
    /// Returns the snapshot to send back for query messages, `None` for
    /// releases and completions.
    pub fn handle(&mut self, msg: Message) -> Option<ListSnapshot> {
        trace!(tag = msg.tag(), "handling message");
        match msg {
            Message::Release(task) => {
                self.release(task);
                None
            }
            Message::Complete {
                task_id,
                completion_time,
            } => {
                self.complete(task_id, completion_time);
                None
            }
            Message::QueryActive => Some(self.snapshot(ListKind::Active)),
            Message::QueryCompleted => Some(self.snapshot(ListKind::Completed)),
            Message::QueryOverdue => Some(self.snapshot(ListKind::Overdue)),
        }
    }

    /// Admit `task` into the active list.
    pub fn release(&mut self, mut task: Task) {
        let now = self.clock.now();
        info!(
            task_id = task.task_id,
            kind = %task.kind,
            release = task.release_time,
            deadline = task.absolute_deadline,
            exec = task.execution_time,
            now,
            "release"
        );

        // The current head may lose the running slot to the newcomer
        if let Some(handle) = self.active.head().and_then(|t| t.executor_handle) {
            self.substrate.set_priority(handle, Priority::Pending);
        }

        let handle = self
            .substrate
            .spawn(ExecutorJob::from(&task), Priority::Pending);
        task.executor_handle = Some(handle);

        self.active.insert_by_deadline(task);
        self.evict_unschedulable(now);
        self.promote_head();
    }

    /// Move the task named by `task_id` from the active list to the
    /// completed list.
    ///
    /// The head is the expected completer.  A non-head match is still
    /// detached from where it sits.  An id not in the active list (already
    /// evicted, or never admitted) is logged and ignored.
    pub fn complete(&mut self, task_id: TaskId, completion_time: Tick) {
        let Some(index) = self.active.position(task_id) else {
            warn!(
                task_id,
                completion_time, "completion for a task not in the active list — ignored"
            );
            return;
        };

        if index != 0 {
            warn!(task_id, position = index, "completion from a non-head task");
        }

        if let Some(mut task) = self.active.remove_at(index) {
            task.stamp_completion(completion_time);
            let missed = completion_time > task.absolute_deadline;
            info!(
                task_id,
                completion_time,
                deadline = task.absolute_deadline,
                missed_deadline = missed,
                "complete"
            );
            self.completed.push_back(task);
        }

        self.promote_head();
    }

    /// Owned copy of one list.
    pub fn snapshot(&self, kind: ListKind) -> ListSnapshot {
        let list = match kind {
            ListKind::Active => &self.active,
            ListKind::Completed => &self.completed,
            ListKind::Overdue => &self.overdue,
        };
        ListSnapshot {
            kind,
            tasks: list.to_vec(),
        }
    }

    /// Evict heads that cannot meet their deadline even if started now.
    fn evict_unschedulable(&mut self, now: Tick) {
        while self
            .active
            .head()
            .is_some_and(|head| head.is_unschedulable_at(now))
        {
            let Some(mut task) = self.active.pop_head() else {
                break;
            };
            task.stamp_completion(now);
            if let Some(handle) = task.executor_handle {
                self.substrate.terminate(handle);
            }
            warn!(
                task_id = task.task_id,
                deadline = task.absolute_deadline,
                exec = task.execution_time,
                now,
                "deadline unreachable — moved to overdue"
            );
            self.overdue.push_back(task);
        }
    }

    /// Hand the running slot to the active-list head, if any.
    fn promote_head(&mut self) {
        if let Some(head) = self.active.head() {
            if let Some(handle) = head.executor_handle {
                debug!(task_id = head.task_id, %handle, "promoted to running");
                self.substrate.set_priority(handle, Priority::Running);
            }
        }
    }
}

// ── Control loop ──────────────────────────────────────────────────────────────

impl<S, C> DeadlineScheduler<S, C>
where
    S: Substrate + Send,
    C: Clock + Send,
{
    /// Consume the control channel until every sender is gone.
    ///
    /// Each receive waits at most `wait_bound`; an idle timeout just loops.
    /// Query responses go out on `responses` with the same bound, and a
    /// failed response is logged and dropped.  Returns the scheduler so the
    /// final lists can be inspected.
    pub async fn run(
        mut self,
        mut inbox: mpsc::Receiver<Message>,
        responses: mpsc::Sender<ListSnapshot>,
        wait_bound: Duration,
    ) -> Self {
        info!(priority = %Priority::SchedulerLoop, "scheduler loop started");

        loop {
            let msg = match recv_bounded(&mut inbox, wait_bound).await {
                Ok(msg) => msg,
                Err(ChannelError::ReceiveTimeout(_)) => {
                    trace!("scheduler idle");
                    continue;
                }
                Err(e) => {
                    info!(reason = %e, "control channel closed — scheduler loop exiting");
                    break;
                }
            };

            if let Some(snapshot) = self.handle(msg) {
                let kind = snapshot.kind;
                if let Err(e) = send_bounded(&responses, snapshot, wait_bound).await {
                    warn!(list = %kind, error = %e, "query response not delivered");
                }
            }
        }

        self
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
