//! Scheduler configuration loading and validation.
//!
//! Every key is optional; an absent file or key falls back to the built-in
//! defaults.  The expected YAML structure is:
//! ```yaml
//! tick_us: 1000
//! profiles:
//!   - { execution_time: 95,  period: 500 }
//!   - { execution_time: 150, period: 500 }
//!   - { execution_time: 250, period: 750 }
//! channel:
//!   capacity: 100
//!   wait_ticks: 1000
//! report_period_ticks: 2000
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::task::{TaskProfile, Tick};

const DEFAULT_TICK_US: u64 = 1_000;
const DEFAULT_CHANNEL_CAPACITY: usize = 100;
const DEFAULT_WAIT_TICKS: Tick = 1_000;
const DEFAULT_REPORT_PERIOD_TICKS: Tick = 2_000;

// ── Private YAML deserialization types ────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default = "default_tick_us")]
    tick_us: u64,
    #[serde(default)]
    profiles: Option<Vec<ProfileEntry>>,
    #[serde(default)]
    channel: ChannelEntry,
    #[serde(default = "default_report_period")]
    report_period_ticks: Tick,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileEntry {
    execution_time: u16,
    period: u16,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChannelEntry {
    #[serde(default = "default_capacity")]
    capacity: usize,
    #[serde(default = "default_wait_ticks")]
    wait_ticks: Tick,
}

impl Default for ChannelEntry {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            wait_ticks: DEFAULT_WAIT_TICKS,
        }
    }
}

fn default_tick_us() -> u64 {
    DEFAULT_TICK_US
}

fn default_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_wait_ticks() -> Tick {
    DEFAULT_WAIT_TICKS
}

fn default_report_period() -> Tick {
    DEFAULT_REPORT_PERIOD_TICKS
}

// ── Validation errors ─────────────────────────────────────────────────────────

/// A configuration that parsed but cannot be run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("profile table is empty")]
    NoProfiles,

    #[error("profile {index}: period must be > 0")]
    ZeroPeriod { index: usize },

    #[error("profile {index}: execution_time must be > 0")]
    ZeroExecutionTime { index: usize },

    #[error("profile {index}: execution_time {execution_time} exceeds period {period}")]
    ExecutionExceedsPeriod {
        index: usize,
        execution_time: u16,
        period: u16,
    },

    #[error("channel capacity must be > 0")]
    ZeroCapacity,

    #[error("tick_us must be > 0")]
    ZeroTick,
}

// ── Public configuration ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Length of one tick in microseconds.
    pub tick_us: u64,
    pub profiles: Vec<TaskProfile>,
    pub channel_capacity: usize,
    /// Bounded wait for every channel send/receive, in ticks.
    pub channel_wait_ticks: Tick,
    pub report_period_ticks: Tick,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_us: DEFAULT_TICK_US,
            profiles: TaskProfile::default_table(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            channel_wait_ticks: DEFAULT_WAIT_TICKS,
            report_period_ticks: DEFAULT_REPORT_PERIOD_TICKS,
        }
    }
}

impl SchedulerConfig {
    /// Parse `path`.  Missing keys take their defaults; the result is not
    /// validated here (CLI overrides are applied first).
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is
    /// structurally invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading scheduler configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot open configuration file: {}", path.display()))?;

        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse YAML file: {}", path.display()))
    }

    fn from_yaml(content: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;

        let profiles = match file.profiles {
            Some(entries) => entries
                .into_iter()
                .map(|p| TaskProfile::new(p.execution_time, p.period))
                .collect(),
            None => TaskProfile::default_table(),
        };
        for (index, p) in profiles.iter().enumerate() {
            debug!(index, execution_time = p.execution_time, period = p.period, "profile");
        }

        Ok(Self {
            tick_us: file.tick_us,
            profiles,
            channel_capacity: file.channel.capacity,
            channel_wait_ticks: file.channel.wait_ticks,
            report_period_ticks: file.report_period_ticks,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_us == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.profiles.is_empty() {
            return Err(ConfigError::NoProfiles);
        }
        for (index, p) in self.profiles.iter().enumerate() {
            if p.period == 0 {
                return Err(ConfigError::ZeroPeriod { index });
            }
            if p.execution_time == 0 {
                return Err(ConfigError::ZeroExecutionTime { index });
            }
            if p.execution_time > p.period {
                return Err(ConfigError::ExecutionExceedsPeriod {
                    index,
                    execution_time: p.execution_time,
                    period: p.period,
                });
            }
        }
        Ok(())
    }

    /// The channel wait bound as wall time.
    pub fn wait_bound(&self) -> Duration {
        Duration::from_micros(self.tick_us.saturating_mul(self.channel_wait_ticks))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
