/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Synthetic periodic workload.
//!
//! One loop drives every profile's stream.  Each cycle releases the next
//! profile in round-robin order at the current tick, records when that
//! profile is next due, and sleeps until the earliest due tick across all
//! profiles (not at all if one is already due).

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::channel::{send_bounded, ChannelError};
use crate::clock::{Clock, TickClock};
use crate::message::Message;
use crate::substrate::Priority;
use crate::task::{Task, TaskId, TaskProfile, Tick};

pub struct TaskGenerator {
    profiles: Vec<TaskProfile>,
    control: mpsc::Sender<Message>,
    clock: TickClock,
    wait_bound: Duration,
    next_id: TaskId,
    cursor: usize,
    /// Next release tick per profile, same indexing as `profiles`.
    next_due: Vec<Tick>,
}

impl TaskGenerator {
    /// Every profile starts due at the clock's current tick.
    pub fn new(
        profiles: Vec<TaskProfile>,
        control: mpsc::Sender<Message>,
        clock: TickClock,
        wait_bound: Duration,
    ) -> Self {
        let now = clock.now();
        let next_due = vec![now; profiles.len()];
        Self {
            profiles,
            control,
            clock,
            wait_bound,
            next_id: 0,
            cursor: 0,
            next_due,
        }
    }

    pub fn next_due(&self) -> &[Tick] {
        &self.next_due
    }

    /// Build the next release at `now` and advance the round-robin cursor.
    ///
    /// Returns `None` only for an empty profile table.
    pub fn next_task(&mut self, now: Tick) -> Option<Task> {
        if self.profiles.is_empty() {
            return None;
        }
        let index = self.cursor % self.profiles.len();
        self.cursor = (index + 1) % self.profiles.len();

        let task = Task::periodic(self.next_id, &self.profiles[index], now);
        self.next_id = self.next_id.wrapping_add(1);
        self.next_due[index] = task.absolute_deadline;
        Some(task)
    }

    /// Earliest pending due tick across all profiles.
    pub fn earliest_due(&self) -> Option<Tick> {
        self.next_due.iter().copied().min()
    }

    /// Ticks to sleep from `now`, clamped to zero when something is due.
    pub fn sleep_ticks(&self, now: Tick) -> Tick {
        self.earliest_due()
            .map_or(0, |due| due.saturating_sub(now))
    }

    /// Release forever.  A release that cannot be queued within the wait
    /// bound is dropped and logged; the loop only stops once the control
    /// channel is closed.
    pub async fn run(mut self) {
        info!(
            priority = %Priority::GeneratorLoop,
            profiles = self.profiles.len(),
            "generator loop started"
        );

        loop {
            let now = self.clock.now();
            let Some(task) = self.next_task(now) else {
                error!("generator has no task profiles — stopping");
                return;
            };
            let task_id = task.task_id;
            let deadline = task.absolute_deadline;

            match send_bounded(&self.control, Message::Release(task), self.wait_bound).await {
                Ok(()) => debug!(task_id, release = now, deadline, "released"),
                Err(ChannelError::Closed) => {
                    info!("control channel closed — generator stopping");
                    return;
                }
                Err(e) => warn!(task_id, error = %e, "release dropped"),
            }

            if let Some(due) = self.earliest_due() {
                self.clock.sleep_until(due).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::recv_bounded;
    use crate::task::TaskKind;

    fn release_of(msg: Message) -> Task {
        match msg {
            Message::Release(task) => task,
            other => panic!("expected a release, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn round_robin_tracks_next_due_per_profile() {
        let (tx, _rx) = mpsc::channel(8);
        let clock = TickClock::start(1_000);
        let mut generator = TaskGenerator::new(
            TaskProfile::default_table(),
            tx,
            clock.clone(),
            clock.ticks(1_000),
        );
        assert_eq!(generator.next_due(), &[0, 0, 0]);

        let t0 = generator.next_task(0).unwrap();
        assert_eq!((t0.task_id, t0.absolute_deadline, t0.execution_time), (0, 500, 95));
        assert_eq!(t0.kind, TaskKind::Periodic);
        assert_eq!(generator.sleep_ticks(0), 0, "other profiles are still due");

        let t1 = generator.next_task(0).unwrap();
        let t2 = generator.next_task(0).unwrap();
        assert_eq!((t1.task_id, t1.execution_time), (1, 150));
        assert_eq!((t2.task_id, t2.absolute_deadline, t2.execution_time), (2, 750, 250));
        assert_eq!(generator.next_due(), &[500, 500, 750]);
        assert_eq!(generator.sleep_ticks(0), 500);
        assert_eq!(generator.sleep_ticks(600), 0, "clamped when already due");

        // Cursor wraps back to the first profile
        let t3 = generator.next_task(500).unwrap();
        assert_eq!((t3.task_id, t3.absolute_deadline), (3, 1_000));
        assert_eq!(generator.next_due(), &[1_000, 500, 750]);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_profile_table_yields_nothing() {
        let (tx, _rx) = mpsc::channel(1);
        let clock = TickClock::start(1_000);
        let mut generator = TaskGenerator::new(Vec::new(), tx, clock.clone(), clock.ticks(10));
        assert!(generator.next_task(0).is_none());
        assert_eq!(generator.earliest_due(), None);
        assert_eq!(generator.sleep_ticks(0), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn release_timeline_for_default_profiles() {
        let (tx, mut rx) = mpsc::channel(100);
        let clock = TickClock::start(1_000);
        let generator = TaskGenerator::new(
            TaskProfile::default_table(),
            tx,
            clock.clone(),
            clock.ticks(1_000),
        );
        tokio::spawn(generator.run());

        let mut seen = Vec::new();
        for _ in 0..9 {
            let msg = recv_bounded(&mut rx, clock.ticks(2_000)).await.unwrap();
            let t = release_of(msg);
            seen.push((t.task_id, t.release_time, t.absolute_deadline));
        }

        assert_eq!(
            seen,
            vec![
                (0, 0, 500),
                (1, 0, 500),
                (2, 0, 750),
                (3, 500, 1_000),
                (4, 500, 1_000),
                (5, 750, 1_500),
                (6, 1_000, 1_500),
                (7, 1_000, 1_500),
                (8, 1_500, 2_250),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_release_is_dropped_not_retried() {
        // Capacity 1 and nobody reading: the second and third releases each
        // wait out the bound and are lost.
        let (tx, mut rx) = mpsc::channel(1);
        let clock = TickClock::start(1_000);
        let generator = TaskGenerator::new(
            TaskProfile::default_table(),
            tx,
            clock.clone(),
            clock.ticks(10),
        );
        tokio::spawn(generator.run());

        clock.sleep(100).await;
        let first = release_of(rx.recv().await.unwrap());
        assert_eq!(first.task_id, 0);

        let next = release_of(recv_bounded(&mut rx, clock.ticks(1_000)).await.unwrap());
        assert_eq!(next.task_id, 3, "ids 1 and 2 were dropped");
        assert_eq!(next.release_time, 500);
    }

    #[tokio::test(start_paused = true)]
    async fn generator_stops_when_control_channel_closes() {
        let (tx, rx) = mpsc::channel(4);
        let clock = TickClock::start(1_000);
        let generator = TaskGenerator::new(
            TaskProfile::default_table(),
            tx,
            clock.clone(),
            clock.ticks(10),
        );
        drop(rx);
        // Returns instead of looping forever
        generator.run().await;
    }
}
