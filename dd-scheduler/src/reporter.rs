/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Periodic reporter: queries the Scheduler Core for its three lists and
//! logs a text report.
//!
//! Queries go out in fixed order (active, completed, overdue), each with a
//! bounded wait for the send and for the matching response.  A failed
//! active or completed query skips the cycle; a failed overdue query is
//! rendered as an empty list.

use std::fmt;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::channel::{send_bounded, ChannelError};
use crate::clock::TickClock;
use crate::message::{ListKind, ListSnapshot, Message};
use crate::substrate::Priority;
use crate::task::{Task, Tick};

// ── Report ────────────────────────────────────────────────────────────────────

/// One full report cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub active: ListSnapshot,
    pub completed: ListSnapshot,
    pub overdue: ListSnapshot,
}

impl Report {
    fn fmt_task(f: &mut fmt::Formatter<'_>, task: &Task) -> fmt::Result {
        write!(
            f,
            "Task ID: {}, Release time: {}, Absolute deadline: {}, Completion time: ",
            task.task_id, task.release_time, task.absolute_deadline
        )?;
        match task.completion_time {
            Some(t) => writeln!(f, "{t}"),
            None => writeln!(f, "-"),
        }
    }

    fn fmt_block(f: &mut fmt::Formatter<'_>, snapshot: &ListSnapshot) -> fmt::Result {
        writeln!(f, "{} LIST", snapshot.kind.name().to_uppercase())?;
        for task in &snapshot.tasks {
            Self::fmt_task(f, task)?;
        }
        writeln!(f, "Number {} tasks: {}", snapshot.kind, snapshot.len())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::fmt_block(f, &self.active)?;
        writeln!(f)?;
        Self::fmt_block(f, &self.completed)?;
        writeln!(f)?;
        Self::fmt_block(f, &self.overdue)
    }
}

// ── Reporter ──────────────────────────────────────────────────────────────────

pub struct Reporter {
    control: mpsc::Sender<Message>,
    responses: mpsc::Receiver<ListSnapshot>,
    clock: TickClock,
    wait_bound: Duration,
    period: Tick,
}

impl Reporter {
    pub fn new(
        control: mpsc::Sender<Message>,
        responses: mpsc::Receiver<ListSnapshot>,
        clock: TickClock,
        wait_bound: Duration,
        period: Tick,
    ) -> Self {
        Self {
            control,
            responses,
            clock,
            wait_bound,
            period,
        }
    }

    /// Ask for one list and wait for its snapshot.
    ///
    /// Snapshots of another kind (left behind by an earlier query that timed
    /// out) are discarded while waiting.
    pub async fn query(&mut self, kind: ListKind) -> Result<ListSnapshot, ChannelError> {
        let bound = self.wait_bound;
        send_bounded(&self.control, kind.query(), bound).await?;

        let responses = &mut self.responses;
        let matching = async {
            loop {
                match responses.recv().await {
                    Some(snapshot) if snapshot.kind == kind => return Ok(snapshot),
                    Some(stale) => {
                        debug!(expected = %kind, got = %stale.kind, "discarding stale snapshot")
                    }
                    None => return Err(ChannelError::Closed),
                }
            }
        };
        tokio::time::timeout(bound, matching)
            .await
            .unwrap_or(Err(ChannelError::ReceiveTimeout(bound)))
    }

    /// Query all three lists.
    pub async fn collect(&mut self) -> Result<Report, ChannelError> {
        let active = self.query(ListKind::Active).await?;
        let completed = self.query(ListKind::Completed).await?;
        let overdue = match self.query(ListKind::Overdue).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(error = %e, "overdue query failed — reporting it as empty");
                ListSnapshot::empty(ListKind::Overdue)
            }
        };
        Ok(Report {
            active,
            completed,
            overdue,
        })
    }

    /// Collect and log one report.  Returns `None` if the cycle was skipped.
    pub async fn report_once(&mut self) -> Option<Report> {
        match self.collect().await {
            Ok(report) => {
                info!("\n{report}");
                Some(report)
            }
            Err(e) => {
                warn!(error = %e, "report cycle skipped");
                None
            }
        }
    }

    /// Report every `period` ticks until the control channel closes.
    pub async fn run(&mut self) {
        info!(
            priority = %Priority::ReporterLoop,
            period = self.period,
            "reporter loop started"
        );
        loop {
            match self.collect().await {
                Ok(report) => info!("\n{report}"),
                Err(ChannelError::Closed) => {
                    info!("scheduler gone — reporter stopping");
                    return;
                }
                Err(e) => warn!(error = %e, "report cycle skipped"),
            }
            self.clock.sleep(self.period).await;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::scheduler::DeadlineScheduler;
    use crate::substrate::recording::RecordingSubstrate;

    fn snapshot(kind: ListKind, tasks: Vec<Task>) -> ListSnapshot {
        ListSnapshot { kind, tasks }
    }

    #[test]
    fn report_renders_every_block_with_counts() {
        let mut done = Task::aperiodic(1, 0, 500, 150);
        done.stamp_completion(245);
        let report = Report {
            active: snapshot(ListKind::Active, vec![Task::aperiodic(2, 0, 750, 250)]),
            completed: snapshot(ListKind::Completed, vec![done]),
            overdue: ListSnapshot::empty(ListKind::Overdue),
        };

        let expected = "\
ACTIVE LIST
Task ID: 2, Release time: 0, Absolute deadline: 750, Completion time: -
Number active tasks: 1

COMPLETED LIST
Task ID: 1, Release time: 0, Absolute deadline: 500, Completion time: 245
Number completed tasks: 1

OVERDUE LIST
Number overdue tasks: 0
";
        assert_eq!(report.to_string(), expected);
    }

    fn reporter_with_channels(
        clock: &TickClock,
    ) -> (Reporter, mpsc::Receiver<Message>, mpsc::Sender<ListSnapshot>) {
        let (control_tx, control_rx) = mpsc::channel(16);
        let (resp_tx, resp_rx) = mpsc::channel(16);
        let reporter = Reporter::new(control_tx, resp_rx, clock.clone(), clock.ticks(1_000), 2_000);
        (reporter, control_rx, resp_tx)
    }

    #[tokio::test(start_paused = true)]
    async fn collects_lists_from_a_live_scheduler() {
        let clock = TickClock::start(1_000);
        let (mut reporter, control_rx, resp_tx) = reporter_with_channels(&clock);

        let mut core = DeadlineScheduler::new(RecordingSubstrate::default(), ManualClock::new(200));
        core.release(Task::aperiodic(0, 200, 300, 95));
        core.release(Task::aperiodic(1, 0, 100, 10)); // evicted at 200
        tokio::spawn(core.run(control_rx, resp_tx, clock.ticks(1_000)));

        let report = reporter.collect().await.unwrap();
        assert_eq!(report.active.len(), 1);
        assert_eq!(report.completed.len(), 0);
        assert_eq!(report.overdue.len(), 1);
        assert_eq!(report.overdue.tasks[0].task_id, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_overdue_response_is_rendered_empty() {
        let clock = TickClock::start(1_000);
        let (mut reporter, mut control_rx, resp_tx) = reporter_with_channels(&clock);

        // Answers active and completed, never overdue
        tokio::spawn(async move {
            while let Some(msg) = control_rx.recv().await {
                let kind = match msg {
                    Message::QueryActive => ListKind::Active,
                    Message::QueryCompleted => ListKind::Completed,
                    _ => continue,
                };
                let _ = resp_tx.send(ListSnapshot::empty(kind)).await;
            }
        });

        let report = reporter.collect().await.unwrap();
        assert_eq!(report.overdue, ListSnapshot::empty(ListKind::Overdue));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_active_response_skips_the_cycle() {
        let clock = TickClock::start(1_000);
        let (mut reporter, _control_rx, _resp_tx) = reporter_with_channels(&clock);

        let err = reporter.collect().await.unwrap_err();
        assert_eq!(err, ChannelError::ReceiveTimeout(clock.ticks(1_000)));
        assert!(reporter.report_once().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_snapshot_is_discarded() {
        let clock = TickClock::start(1_000);
        let (mut reporter, mut control_rx, resp_tx) = reporter_with_channels(&clock);

        // Leftover from an earlier, timed-out completed query
        resp_tx
            .send(ListSnapshot::empty(ListKind::Completed))
            .await
            .unwrap();
        resp_tx
            .send(snapshot(ListKind::Active, vec![Task::aperiodic(9, 0, 10, 1)]))
            .await
            .unwrap();

        let active = reporter.query(ListKind::Active).await.unwrap();
        assert_eq!(active.kind, ListKind::Active);
        assert_eq!(active.tasks[0].task_id, 9);
        assert_eq!(control_rx.recv().await, Some(Message::QueryActive));
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_when_scheduler_is_gone() {
        let clock = TickClock::start(1_000);
        let (mut reporter, control_rx, _resp_tx) = reporter_with_channels(&clock);
        drop(control_rx);
        reporter.run().await;
    }
}
