/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use dd_scheduler::clock::{Clock, TickClock};
use dd_scheduler::config::SchedulerConfig;
use dd_scheduler::generator::TaskGenerator;
use dd_scheduler::reporter::Reporter;
use dd_scheduler::scheduler::feasibility::{
    check_edf_bound, edf_utilization, hyperperiod, EDF_UTILIZATION_BOUND,
};
use dd_scheduler::scheduler::DeadlineScheduler;
use dd_scheduler::substrate::TokioSubstrate;
use dd_scheduler::task::Tick;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Deadline-driven (EDF) task scheduler with a synthetic periodic workload.
///
/// Example:
///   dd-scheduler --config scheduler.yaml --run-for 10000
#[derive(Debug, Parser)]
#[command(
    name = "dd-scheduler",
    about = "Deadline-driven (EDF) task scheduler",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML scheduler configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Length of one tick in microseconds (overrides the file).
    #[arg(short = 't', long = "tick-us")]
    tick_us: Option<u64>,

    /// Ticks between reports (overrides the file).
    #[arg(short = 'r', long = "report-period")]
    report_period: Option<Tick>,

    /// Stop after this many ticks instead of waiting for Ctrl-C.
    #[arg(long = "run-for")]
    run_for: Option<Tick>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // ── Load configuration ────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => match SchedulerConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load scheduler configuration: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No configuration file provided, using default scheduler settings");
            SchedulerConfig::default()
        }
    };
    if let Some(tick_us) = cli.tick_us {
        config.tick_us = tick_us;
    }
    if let Some(period) = cli.report_period {
        config.report_period_ticks = period;
    }
    if let Err(e) = config.validate() {
        error!("Invalid scheduler configuration: {e}");
        process::exit(1);
    }

    info!(
        tick_us = config.tick_us,
        profiles = config.profiles.len(),
        channel_capacity = config.channel_capacity,
        wait_ticks = config.channel_wait_ticks,
        report_period = config.report_period_ticks,
        run_for = ?cli.run_for,
        "Configuration"
    );

    // ── Feasibility diagnostics ───────────────────────────────────────────────
    match check_edf_bound(&config.profiles) {
        Some(u) => warn!(
            utilization = u,
            bound = EDF_UTILIZATION_BOUND,
            "profile table exceeds the EDF bound; expect overdue tasks"
        ),
        None => info!(
            utilization = edf_utilization(&config.profiles),
            "profile table fits the EDF bound"
        ),
    }
    match hyperperiod(&config.profiles) {
        Ok(h) => info!(hyperperiod = h, "release pattern repeats every hyperperiod"),
        Err(e) => warn!(error = %e, "hyperperiod unavailable"),
    }

    // ── Wire the loops ────────────────────────────────────────────────────────
    let clock = TickClock::start(config.tick_us);
    let wait_bound = config.wait_bound();
    let (control_tx, control_rx) = mpsc::channel(config.channel_capacity);
    let (response_tx, response_rx) = mpsc::channel(config.channel_capacity);

    let substrate = TokioSubstrate::new(control_tx.clone(), clock.clone(), wait_bound);
    let core = DeadlineScheduler::new(substrate, clock.clone());
    let scheduler = tokio::spawn(core.run(control_rx, response_tx, wait_bound));

    let generator = TaskGenerator::new(
        config.profiles.clone(),
        control_tx.clone(),
        clock.clone(),
        wait_bound,
    );
    let generator = tokio::spawn(generator.run());

    let mut reporter = Reporter::new(
        control_tx,
        response_rx,
        clock.clone(),
        wait_bound,
        config.report_period_ticks,
    );

    tokio::select! {
        _ = reporter.run() => {}
        _ = shutdown_signal(&clock, cli.run_for) => {}
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────
    generator.abort();
    info!(now = clock.now(), "shutting down; final report follows");
    reporter.report_once().await;
    scheduler.abort();
}

/// Resolves after `run_for` ticks, or on Ctrl-C when no run length is set.
async fn shutdown_signal(clock: &TickClock, run_for: Option<Tick>) {
    match run_for {
        Some(ticks) => {
            clock.sleep(ticks).await;
            info!(ticks, "run length reached");
        }
        None => match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Ctrl-C received"),
            Err(e) => error!("Failed to listen for Ctrl-C: {e}"),
        },
    }
}
