/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Owned, ordered task sequence used for the active, completed and overdue
//! lists.
//!
//! Each list owns its [`Task`]s outright.  Moving a task between lists is a
//! move out of one `TaskList` and into another; no task is ever shared.

use std::collections::VecDeque;

use crate::task::{Task, TaskId};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: VecDeque<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn head(&self) -> Option<&Task> {
        self.tasks.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn push_back(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    /// Detach and return the head.
    pub fn pop_head(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Position of `task_id`, head = 0.
    pub fn position(&self, task_id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|t| t.task_id == task_id)
    }

    /// Detach the task at `index`, preserving the order of the rest.
    pub fn remove_at(&mut self, index: usize) -> Option<Task> {
        self.tasks.remove(index)
    }

    /// Append `task` and restore ascending-deadline order.
    pub fn insert_by_deadline(&mut self, task: Task) {
        self.tasks.push_back(task);
        self.sort_by_deadline();
    }

    /// Adjacent-swap passes until a pass swaps nothing.
    ///
    /// Each pass bubbles the latest deadline to the end of the unsorted
    /// prefix.  Only strictly-later deadlines swap, so equal deadlines keep
    /// their arrival order.
    pub fn sort_by_deadline(&mut self) {
        let mut end = self.tasks.len();
        while end > 1 {
            let mut swapped = false;
            for i in 1..end {
                if self.tasks[i - 1].absolute_deadline > self.tasks[i].absolute_deadline {
                    self.tasks.swap(i - 1, i);
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
            end -= 1;
        }
    }

    /// `true` if deadlines never decrease from head to tail.
    pub fn is_deadline_ordered(&self) -> bool {
        self.tasks
            .iter()
            .zip(self.tasks.iter().skip(1))
            .all(|(a, b)| a.absolute_deadline <= b.absolute_deadline)
    }

    /// Owned copy of the tasks, head first.
    pub fn to_vec(&self) -> Vec<Task> {
        self.tasks.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: TaskId, deadline: u64) -> Task {
        Task::aperiodic(id, 0, deadline, 1)
    }

    fn ids(list: &TaskList) -> Vec<TaskId> {
        list.iter().map(|t| t.task_id).collect()
    }

    #[test]
    fn insert_keeps_ascending_deadline_order() {
        let mut list = TaskList::new();
        for (id, deadline) in [(0, 500), (1, 300), (2, 750), (3, 100), (4, 600)] {
            list.insert_by_deadline(task(id, deadline));
            assert!(list.is_deadline_ordered());
        }
        assert_eq!(ids(&list), vec![3, 1, 0, 4, 2]);
    }

    #[test]
    fn equal_deadlines_keep_arrival_order() {
        let mut list = TaskList::new();
        list.insert_by_deadline(task(0, 500));
        list.insert_by_deadline(task(1, 500));
        list.insert_by_deadline(task(2, 200));
        list.insert_by_deadline(task(3, 500));
        assert_eq!(ids(&list), vec![2, 0, 1, 3]);
    }

    #[test]
    fn sort_handles_reverse_ordered_input() {
        let mut list = TaskList::new();
        for (id, deadline) in [(0, 50), (1, 40), (2, 30), (3, 20), (4, 10)] {
            list.push_back(task(id, deadline));
        }
        assert!(!list.is_deadline_ordered());
        list.sort_by_deadline();
        assert_eq!(ids(&list), vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn remove_at_preserves_remaining_order() {
        let mut list = TaskList::new();
        for (id, deadline) in [(0, 10), (1, 20), (2, 30)] {
            list.insert_by_deadline(task(id, deadline));
        }
        let pos = list.position(1).unwrap();
        let removed = list.remove_at(pos).unwrap();
        assert_eq!(removed.task_id, 1);
        assert_eq!(ids(&list), vec![0, 2]);
        assert_eq!(list.position(1), None);
    }

    #[test]
    fn empty_list_behaviour() {
        let mut list = TaskList::new();
        assert!(list.is_empty());
        assert!(list.head().is_none());
        assert!(list.pop_head().is_none());
        list.sort_by_deadline();
        assert!(list.is_deadline_ordered());
    }
}
