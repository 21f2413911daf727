/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Messages exchanged with the Scheduler Core.
//!
//! The control channel carries [`Message`]; the response channel carries
//! [`ListSnapshot`].  Each variant carries exactly the payload its tag needs,
//! so a message can never be read as the wrong kind.

use std::fmt;

use crate::task::{Task, TaskId, Tick};

/// Which of the three scheduler lists a query or snapshot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Active,
    Completed,
    Overdue,
}

impl ListKind {
    /// Lower-case list name as it appears in report count lines.
    pub fn name(self) -> &'static str {
        match self {
            ListKind::Active => "active",
            ListKind::Completed => "completed",
            ListKind::Overdue => "overdue",
        }
    }

    /// The query message that asks for this list.
    pub fn query(self) -> Message {
        match self {
            ListKind::Active => Message::QueryActive,
            ListKind::Completed => Message::QueryCompleted,
            ListKind::Overdue => Message::QueryOverdue,
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Control-channel message.  Owned by the sender until handed to the
/// channel, by the Scheduler Core afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Admit a new task.
    Release(Task),
    /// The executor of `task_id` finished at `completion_time`.
    Complete {
        task_id: TaskId,
        completion_time: Tick,
    },
    QueryActive,
    QueryCompleted,
    QueryOverdue,
}

impl Message {
    /// Short tag used in log lines.
    pub fn tag(&self) -> &'static str {
        match self {
            Message::Release(_) => "release",
            Message::Complete { .. } => "complete",
            Message::QueryActive => "query_active",
            Message::QueryCompleted => "query_completed",
            Message::QueryOverdue => "query_overdue",
        }
    }
}

/// Point-in-time copy of one scheduler list, in list order.
///
/// The Scheduler Core builds it while processing the query, so later
/// releases or completions never show through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    pub kind: ListKind,
    pub tasks: Vec<Task>,
}

impl ListSnapshot {
    pub fn empty(kind: ListKind) -> Self {
        Self {
            kind,
            tasks: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_for_each_list_kind() {
        assert_eq!(ListKind::Active.query(), Message::QueryActive);
        assert_eq!(ListKind::Completed.query(), Message::QueryCompleted);
        assert_eq!(ListKind::Overdue.query(), Message::QueryOverdue);
    }

    #[test]
    fn list_names_are_lower_case() {
        assert_eq!(ListKind::Completed.to_string(), "completed");
        assert_eq!(ListKind::Overdue.name(), "overdue");
    }
}
