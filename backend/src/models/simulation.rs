//! Daily cash-flow simulation
//!
//! Produces one believable "business day" of cash movement for a vendor
//! nobody is trading with. The day is fully determined by
//! `(start_time, starting_cash, transaction_count, seed)`; only those four
//! values are ever persisted and the entries are regenerated on demand.
//!
//! # Algorithm
//!
//! ```text
//! 1. day length  = 24h ± U[-1,1) * spread
//! 2. target      = U[target_low, target_high)
//! 3. net flow    = U[0, max_inflow) or -U[0, max_outflow), never past target
//! 4. partition   time and flow into N normalised random weights
//! 5. sort by time, running balances from starting_cash
//! ```

use crate::config::LedgerConfig;
use crate::core::time::{format_seconds, seconds_f64, Timestamp, SECONDS_PER_DAY, SECONDS_PER_HOUR};
use crate::models::entry::{recompute_running_balances, LedgerEntry};
use crate::rng::RngManager;
use chrono::Duration;
use std::fmt;

/// One simulated day of vendor cash flow
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use vendor_cashflow_core_rs::{DailySimulation, LedgerConfig};
///
/// let config = LedgerConfig::default();
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap();
/// let day = DailySimulation::generate("vendor_1", start, 30_000, 7, 42, &config);
///
/// assert_eq!(day.entries().len(), 7);
/// assert!(day.end_time() > start);
/// // Cash above the band drains toward it, and never past the target.
/// assert!(day.ending_cash() <= 30_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailySimulation {
    start_time: Timestamp,
    starting_cash: i64,
    transaction_count: usize,
    seed: u64,

    // Everything below is derived from the four fields above.
    end_time: Timestamp,
    target_cash: i64,
    net_cash_flow: i64,
    entries: Vec<LedgerEntry>,
}

impl DailySimulation {
    /// Generate the day. `vendor_id` becomes the counterpart of every entry.
    pub fn generate(
        vendor_id: &str,
        start_time: Timestamp,
        starting_cash: i64,
        transaction_count: usize,
        seed: u64,
        config: &LedgerConfig,
    ) -> Self {
        let mut rng = RngManager::new(seed);

        let spread_secs = (config.day_length_spread_hours * SECONDS_PER_HOUR) as f64;
        let day_secs = SECONDS_PER_DAY as f64 + rng.next_signed_unit() * spread_secs;
        let end_time = start_time + seconds_f64(day_secs);

        let target_cash = rng.range(config.target_cash_low, config.target_cash_high);
        let net_cash_flow = draw_net_cash_flow(&mut rng, starting_cash, target_cash, config);

        let mut entries = Vec::with_capacity(transaction_count);
        if transaction_count > 0 {
            let (time_weights, flow_weights) = draw_partitions(&mut rng, transaction_count);

            // Clamp so rounding never stamps an entry after end_time.
            let last_second = day_secs.floor();
            for (time_w, flow_w) in time_weights.iter().zip(flow_weights.iter()) {
                let offset = (time_w * day_secs).round().min(last_second) as i64;
                let amount = (flow_w * net_cash_flow as f64).round() as i64;
                entries.push(LedgerEntry::new(
                    start_time + Duration::seconds(offset),
                    amount,
                    vendor_id,
                ));
            }
        }

        // Time and flow weights are drawn independently, so generation order
        // is not chronological.
        entries.sort_by_key(|e| e.timestamp());
        recompute_running_balances(&mut entries, starting_cash);

        Self {
            start_time,
            starting_cash,
            transaction_count,
            seed,
            end_time,
            target_cash,
            net_cash_flow,
            entries,
        }
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn starting_cash(&self) -> i64 {
        self.starting_cash
    }

    pub fn transaction_count(&self) -> usize {
        self.transaction_count
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn end_time(&self) -> Timestamp {
        self.end_time
    }

    /// Cash level this day was drifting toward
    pub fn target_cash(&self) -> i64 {
        self.target_cash
    }

    pub fn net_cash_flow(&self) -> i64 {
        self.net_cash_flow
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Cash after the last simulated entry, ignoring any player activity
    pub fn ending_cash(&self) -> i64 {
        self.entries
            .last()
            .map_or(self.starting_cash, |e| e.running_balance())
    }
}

fn draw_net_cash_flow(
    rng: &mut RngManager,
    starting_cash: i64,
    target_cash: i64,
    config: &LedgerConfig,
) -> i64 {
    let distance = target_cash - starting_cash;
    if distance > 0 {
        rng.range(0, config.max_daily_inflow).min(distance)
    } else if distance < 0 {
        -rng.range(0, config.max_daily_outflow).min(-distance)
    } else {
        0
    }
}

/// Two independent sets of `n` weights, each normalised to sum to 1.
fn draw_partitions(rng: &mut RngManager, n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut time_weights = vec![0.0; n];
    let mut flow_weights = vec![0.0; n];
    loop {
        for i in 0..n {
            time_weights[i] = rng.next_f64();
            flow_weights[i] = rng.next_f64();
        }

        let time_sum: f64 = time_weights.iter().sum();
        let flow_sum: f64 = flow_weights.iter().sum();
        if time_sum == 0.0 || flow_sum == 0.0 {
            continue;
        }

        time_weights.iter_mut().for_each(|w| *w /= time_sum);
        flow_weights.iter_mut().for_each(|w| *w /= flow_sum);
        return (time_weights, flow_weights);
    }
}

impl fmt::Display for DailySimulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Start Time = {}", format_seconds(&self.start_time))?;
        writeln!(f, "End Time   = {}", format_seconds(&self.end_time))?;
        writeln!(f, "Starting Cash = {}", self.starting_cash)?;
        writeln!(f, "Num Transactions = {}", self.transaction_count)?;
        writeln!(f, "Random Seed = {:X}", self.seed)?;
        let amounts: Vec<String> = self.entries.iter().map(|e| e.amount().to_string()).collect();
        writeln!(f, "Amounts = [{}]", amounts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entry::is_sorted_by_time;
    use chrono::{TimeZone, Utc};

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_zero_transactions_produces_empty_day() {
        let day = DailySimulation::generate("v", start(), 10_000, 0, 1, &LedgerConfig::default());
        assert!(day.entries().is_empty());
        assert_eq!(day.ending_cash(), 10_000);
    }

    #[test]
    fn test_entries_sorted_and_inside_day() {
        let config = LedgerConfig::default();
        for seed in 1..50 {
            let day = DailySimulation::generate("v", start(), 1_000, 7, seed, &config);
            assert!(is_sorted_by_time(day.entries()));
            for e in day.entries() {
                assert!(e.timestamp() >= day.start_time());
                assert!(e.timestamp() <= day.end_time());
            }
        }
    }

    #[test]
    fn test_day_length_within_spread() {
        let config = LedgerConfig::default();
        for seed in 1..50 {
            let day = DailySimulation::generate("v", start(), 10_000, 7, seed, &config);
            let length = day.end_time() - day.start_time();
            assert!(length >= Duration::hours(22) && length <= Duration::hours(26));
        }
    }

    #[test]
    fn test_counterpart_is_vendor() {
        let day = DailySimulation::generate("smith_7", start(), 10_000, 7, 3, &LedgerConfig::default());
        assert!(day.entries().iter().all(|e| e.counterpart() == "smith_7"));
    }
}
