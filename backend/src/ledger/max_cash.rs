//! Maximum cash-on-hand policy
//!
//! Each vendor has a spending ceiling that is re-rolled on a drifting
//! schedule. Re-rolls happen lazily, when a real transaction is recorded at
//! or after the scheduled reset time, so a vendor idle for months costs a
//! handful of draws rather than one per missed interval.

use crate::config::LedgerConfig;
use crate::core::time::{days, seconds_f64, Timestamp, SECONDS_PER_DAY};
use crate::rng::RngManager;
use chrono::DateTime;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxCashPolicy {
    current_max_cash: i64,
    next_reset: Timestamp,
}

impl MaxCashPolicy {
    /// Ceiling at the low end of the band and a reset already due, so the
    /// first real transaction rolls a proper ceiling.
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            current_max_cash: config.max_cash_low,
            next_reset: DateTime::UNIX_EPOCH,
        }
    }

    pub fn from_parts(current_max_cash: i64, next_reset: Timestamp) -> Self {
        Self {
            current_max_cash,
            next_reset,
        }
    }

    pub fn current_max_cash(&self) -> i64 {
        self.current_max_cash
    }

    pub fn next_reset(&self) -> Timestamp {
        self.next_reset
    }

    /// Re-roll the ceiling if `t` has reached the scheduled reset.
    ///
    /// A local generator is forked from `stream` only when a re-roll happens.
    /// Returns whether the ceiling changed.
    pub fn refresh(&mut self, t: Timestamp, stream: &mut RngManager, config: &LedgerConfig) -> bool {
        if t < self.next_reset {
            return false;
        }

        let mut rng = stream.fork();

        // Far behind: jump to a random point within one max interval of `t`
        // instead of walking every missed interval.
        let max_days = config.max_days_before_max_cash_reset;
        if t > self.next_reset + days(max_days) {
            let back_secs = rng.next_f64() * (max_days * SECONDS_PER_DAY) as f64;
            self.next_reset = t - seconds_f64(back_secs);
        }

        while t >= self.next_reset {
            self.next_reset = next_reset_after(&mut rng, self.next_reset, config);
        }

        // Only the latest draw matters; the ceiling is not path-dependent.
        self.current_max_cash = rng.range(config.max_cash_low, config.max_cash_high);
        info!(
            max_cash = self.current_max_cash,
            next_reset = %self.next_reset,
            "max cash ceiling re-rolled"
        );
        true
    }

    /// Corrective amount (negative) that pins `cash` back to the ceiling, or
    /// `None` when `cash` is within it.
    pub fn correction_for(&self, cash: i64) -> Option<i64> {
        (cash > self.current_max_cash).then(|| self.current_max_cash - cash)
    }
}

fn next_reset_after(rng: &mut RngManager, current: Timestamp, config: &LedgerConfig) -> Timestamp {
    let min_secs = (config.min_days_before_max_cash_reset * SECONDS_PER_DAY) as f64;
    let spread_secs = ((config.max_days_before_max_cash_reset
        - config.min_days_before_max_cash_reset)
        * SECONDS_PER_DAY) as f64;
    let interval = (min_secs + rng.next_f64() * spread_secs).max(1.0);
    current + seconds_f64(interval)
}
