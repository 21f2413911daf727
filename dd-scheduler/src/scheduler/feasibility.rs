/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedulability diagnostics for the generator's profile table.
//!
//! # Status: warning only
//!
//! The utilisation bound is **computed and logged** at startup.  An
//! overloaded table is not rejected: the Scheduler Core's eviction pass is
//! the run-time gate, and overload simply shows up as tasks in the overdue
//! list.
//!
//! # Theory
//! For independent periodic tasks whose relative deadline equals their
//! period, preemptive EDF on one CPU meets every deadline **if and only if**
//!
//! $$U = \sum_{i=1}^{n} \frac{C_i}{T_i} \leq 1$$
//!
//! The release pattern repeats every hyperperiod (the LCM of all periods),
//! so one hyperperiod of simulated time exercises every release phasing.
//!
//! | Profiles | U |
//! |---|---|
//! | (95,500) (150,500) (250,750) | 0.823 |

use thiserror::Error;

use crate::task::{TaskProfile, Tick};

/// EDF exact bound for implicit-deadline periodic tasks on one CPU.
pub const EDF_UTILIZATION_BOUND: f64 = 1.0;

/// Failure to compute the hyperperiod.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeasibilityError {
    #[error("no profile with a non-zero period")]
    NoValidPeriods,

    #[error("LCM overflow computing lcm({a}, {b})")]
    Overflow { a: u64, b: u64 },
}

// ── Utilisation ───────────────────────────────────────────────────────────────

/// Total CPU utilisation of the profile table.  Zero-period profiles add
/// nothing.
pub fn edf_utilization(profiles: &[TaskProfile]) -> f64 {
    profiles.iter().map(TaskProfile::utilization).sum()
}

/// `None` when the table fits under the EDF bound, `Some(U)` when it does
/// not.
pub fn check_edf_bound(profiles: &[TaskProfile]) -> Option<f64> {
    let u = edf_utilization(profiles);
    if u > EDF_UTILIZATION_BOUND {
        Some(u)
    } else {
        None
    }
}

// ── Hyperperiod ───────────────────────────────────────────────────────────────

/// Iterative Euclidean GCD.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// Checked LCM, `Ok(0)` if either side is zero.
pub fn lcm(a: u64, b: u64) -> Result<u64, FeasibilityError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd(a, b))
        .checked_mul(b)
        .ok_or(FeasibilityError::Overflow { a, b })
}

/// Ticks after which the generator's release pattern repeats.
pub fn hyperperiod(profiles: &[TaskProfile]) -> Result<Tick, FeasibilityError> {
    let mut periods: Vec<u64> = profiles
        .iter()
        .filter(|p| p.period > 0)
        .map(|p| u64::from(p.period))
        .collect();
    if periods.is_empty() {
        return Err(FeasibilityError::NoValidPeriods);
    }
    periods.sort_unstable();
    periods.dedup();

    periods.iter().try_fold(1, |acc, &p| lcm(acc, p))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_is_feasible() {
        let table = TaskProfile::default_table();
        let u = edf_utilization(&table);
        assert!((u - (0.19 + 0.30 + 1.0 / 3.0)).abs() < 1e-9, "U = {u}");
        assert!(check_edf_bound(&table).is_none());
    }

    #[test]
    fn overloaded_table_exceeds_bound() {
        let table = vec![
            TaskProfile::new(300, 500),
            TaskProfile::new(300, 500),
        ];
        let u = check_edf_bound(&table).expect("1.2 > 1.0");
        assert!((u - 1.2).abs() < 1e-9);
    }

    #[test]
    fn full_utilization_is_still_feasible() {
        // Exactly 1.0: EDF bound is ≤, not <
        let table = vec![TaskProfile::new(250, 500), TaskProfile::new(250, 500)];
        assert!(check_edf_bound(&table).is_none());
    }

    #[test]
    fn empty_table_has_zero_utilization() {
        assert_eq!(edf_utilization(&[]), 0.0);
        assert!(check_edf_bound(&[]).is_none());
    }

    #[test]
    fn gcd_and_lcm_basics() {
        assert_eq!(gcd(500, 750), 250);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(lcm(500, 750).unwrap(), 1_500);
        assert_eq!(lcm(0, 750).unwrap(), 0);
    }

    #[test]
    fn lcm_overflow_is_an_error() {
        let a = u64::MAX / 2 + 1;
        let b = u64::MAX / 2 + 3;
        assert!(matches!(lcm(a, b), Err(FeasibilityError::Overflow { .. })));
    }

    #[test]
    fn default_table_hyperperiod() {
        assert_eq!(hyperperiod(&TaskProfile::default_table()).unwrap(), 1_500);
    }

    #[test]
    fn hyperperiod_without_periods_is_an_error() {
        assert_eq!(hyperperiod(&[]), Err(FeasibilityError::NoValidPeriods));
        assert_eq!(
            hyperperiod(&[TaskProfile::new(5, 0)]),
            Err(FeasibilityError::NoValidPeriods)
        );
    }
}
