/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! dd-scheduler – deadline-driven (EDF) task scheduler
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── config/       – YAML configuration + validation
//! ├── scheduler/    – Scheduler Core, task lists, feasibility diagnostics
//! ├── task          – Task, TaskProfile, ExecutorHandle, Tick
//! ├── message       – control-channel messages and list snapshots
//! ├── channel       – bounded send / receive
//! ├── clock         – tick clock (tokio time) and manual clock
//! ├── substrate     – executor priorities, spawn / terminate
//! ├── executor      – per-task executor body
//! ├── generator     – synthetic periodic workload
//! └── reporter      – periodic list report
//! ```

pub mod channel;
pub mod clock;
pub mod config;
pub mod executor;
pub mod generator;
pub mod message;
pub mod reporter;
pub mod scheduler;
pub mod substrate;
pub mod task;
