/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Core task data structures for the deadline-driven scheduler.
//!
//! ```text
//! TaskProfile ──(generator)──►  Task  ──(Release)──►  active list  ──►  completed | overdue
//!  immutable                     owned by whichever list holds it
//! ```
//!
//! # Ownership model
//! A [`Task`] is built by the generator, **moved** into a `Release` message,
//! and from then on owned by exactly one of the Scheduler Core's three lists.
//! Moving between lists moves the value; there is never a second live copy
//! inside the core.  Query responses hand out clones, never references.

use std::fmt;

/// Monotonic tick count.  One tick is the configured `tick_us` duration
/// (1 ms by default).
pub type Tick = u64;

/// Task identifier, unique within one generator session.
pub type TaskId = u32;

// ── TaskKind ──────────────────────────────────────────────────────────────────

/// Release pattern of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskKind {
    /// Released repeatedly from a [`TaskProfile`].
    #[default]
    Periodic,
    /// One-shot release; never produced by the in-process generator.
    Aperiodic,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Periodic => f.write_str("periodic"),
            TaskKind::Aperiodic => f.write_str("aperiodic"),
        }
    }
}

// ── ExecutorHandle ────────────────────────────────────────────────────────────

/// Opaque reference to the execution unit spawned for a task.
///
/// Issued by a [`Substrate`](crate::substrate::Substrate); only meaningful to
/// the substrate that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutorHandle(pub u64);

impl fmt::Display for ExecutorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exec#{}", self.0)
    }
}

// ── TaskProfile ───────────────────────────────────────────────────────────────

/// Immutable `(execution_time, period)` pair the generator cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskProfile {
    /// CPU ticks one release of this profile needs.
    pub execution_time: u16,
    /// Ticks between releases; also the relative deadline.
    pub period: u16,
}

impl TaskProfile {
    pub const fn new(execution_time: u16, period: u16) -> Self {
        Self {
            execution_time,
            period,
        }
    }

    /// The built-in three-profile table: (95,500), (150,500), (250,750).
    pub fn default_table() -> Vec<TaskProfile> {
        vec![
            TaskProfile::new(95, 500),
            TaskProfile::new(150, 500),
            TaskProfile::new(250, 750),
        ]
    }

    /// CPU utilisation fraction `execution_time / period`.
    ///
    /// Returns `0.0` for a zero period.
    pub fn utilization(&self) -> f64 {
        if self.period == 0 {
            0.0
        } else {
            f64::from(self.execution_time) / f64::from(self.period)
        }
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// The unit of schedulable work.
///
/// `absolute_deadline` and `execution_time` are fixed at construction.
/// `completion_time` is written once, when the task lands in the completed
/// or overdue list; see [`Task::stamp_completion`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub task_id: TaskId,
    pub kind: TaskKind,
    /// Tick at admission.
    pub release_time: Tick,
    /// Tick by which execution must have finished.
    pub absolute_deadline: Tick,
    /// Tick of completion or eviction; `None` while the task is active.
    pub completion_time: Option<Tick>,
    /// CPU ticks the task needs.
    pub execution_time: Tick,
    /// Execution unit running this task; `None` before spawn.
    pub executor_handle: Option<ExecutorHandle>,
}

impl Task {
    /// Build a periodic release of `profile` at tick `now`.
    pub fn periodic(task_id: TaskId, profile: &TaskProfile, now: Tick) -> Self {
        Self {
            task_id,
            kind: TaskKind::Periodic,
            release_time: now,
            absolute_deadline: now.saturating_add(Tick::from(profile.period)),
            completion_time: None,
            execution_time: Tick::from(profile.execution_time),
            executor_handle: None,
        }
    }

    /// Build a one-shot release with a deadline relative to `now`.
    pub fn aperiodic(
        task_id: TaskId,
        now: Tick,
        relative_deadline: Tick,
        execution_time: Tick,
    ) -> Self {
        Self {
            task_id,
            kind: TaskKind::Aperiodic,
            release_time: now,
            absolute_deadline: now.saturating_add(relative_deadline),
            completion_time: None,
            execution_time,
            executor_handle: None,
        }
    }

    /// `true` when the task cannot finish by its deadline even if it starts
    /// at `now` and runs uninterrupted.
    pub fn is_unschedulable_at(&self, now: Tick) -> bool {
        self.absolute_deadline < now.saturating_add(self.execution_time)
    }

    /// Record the terminal tick.  Later calls keep the first value.
    pub fn stamp_completion(&mut self, tick: Tick) {
        if self.completion_time.is_none() {
            self.completion_time = Some(tick);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
