/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Monotonic tick clock.
//!
//! [`TickClock`] is the production clock: tokio's monotonic `Instant`
//! measured in ticks of a configurable length since the clock was created.
//! Because it reads `tokio::time::Instant`, a paused tokio runtime drives it
//! deterministically in tests.
//!
//! [`ManualClock`] is a settable clock for driving the Scheduler Core
//! step-by-step.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::task::Tick;

/// Read-only view of the current tick.
pub trait Clock {
    fn now(&self) -> Tick;
}

// ── TickClock ─────────────────────────────────────────────────────────────────

/// Tokio-backed tick clock.  Cheap to clone; clones share the same origin.
#[derive(Debug, Clone)]
pub struct TickClock {
    origin: Instant,
    tick_us: u64,
}

impl TickClock {
    /// Start a clock at tick 0 with ticks of `tick_us` microseconds.
    ///
    /// A zero tick length is bumped to 1 µs.
    pub fn start(tick_us: u64) -> Self {
        Self {
            origin: Instant::now(),
            tick_us: tick_us.max(1),
        }
    }

    pub fn tick_us(&self) -> u64 {
        self.tick_us
    }

    /// Wall duration of `ticks` ticks.
    pub fn ticks(&self, ticks: Tick) -> Duration {
        Duration::from_micros(self.tick_us.saturating_mul(ticks))
    }

    /// Suspend the calling task for `ticks` ticks.
    pub async fn sleep(&self, ticks: Tick) {
        tokio::time::sleep(self.ticks(ticks)).await;
    }

    /// Suspend the calling task until the clock reads `tick`.
    pub async fn sleep_until(&self, tick: Tick) {
        tokio::time::sleep_until(self.origin + self.ticks(tick)).await;
    }
}

impl Clock for TickClock {
    fn now(&self) -> Tick {
        let elapsed_us = self.origin.elapsed().as_micros();
        (elapsed_us / u128::from(self.tick_us)) as Tick
    }
}

// ── ManualClock ───────────────────────────────────────────────────────────────

/// Clock whose value only changes when told to.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Tick) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn set(&self, tick: Tick) {
        self.now.store(tick, Ordering::SeqCst);
    }

    pub fn advance(&self, ticks: Tick) {
        self.now.fetch_add(ticks, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Tick {
        self.now.load(Ordering::SeqCst)
    }
}
