//! Vendor ledger
//!
//! Per-vendor cash state:
//! - real entries (player trades, ceiling corrections, merged simulated days)
//! - starting balance (cash before the first entry)
//! - the active daily simulation, if any
//! - the max-cash policy
//! - the vendor's seed stream
//!
//! # Catch-up
//!
//! Every query first advances the simulation to the instant asked about:
//!
//! ```text
//! no simulation  → draw balance in band, start a day 1min..24h before t, merge
//! otherwise      → merge up to t
//! while active day ended before t:
//!     cash at day end in band and no external entry since the day's
//!     start → idle += 1, else idle = 0
//!     idle == threshold → forget history, re-initialise (once per call)
//!     otherwise start the next day at the old end, merge
//! ```
//!
//! The dormancy collapse is what bounds the loop for vendors nobody visits
//! for months.
//!
//! # Critical Invariants
//!
//! 1. Entries are sorted by timestamp
//! 2. Running balances follow from `starting_balance`
//! 3. Cash on hand at the time of a recorded transaction never exceeds the
//!    current ceiling

use crate::config::LedgerConfig;
use crate::core::time::Timestamp;
use crate::ledger::max_cash::MaxCashPolicy;
use crate::ledger::merge::{insert_sorted, merge_simulated, truncate_before};
use crate::models::entry::{latest_entry_at_or_before, LedgerEntry};
use crate::models::simulation::DailySimulation;
use crate::rng::RngManager;
use chrono::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors from the configuration and persistence surfaces of a ledger.
/// Cash queries and transactions themselves cannot fail.
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Config mismatch: snapshot was taken with config {expected}, got {actual}")]
    ConfigMismatch { expected: String, actual: String },

    #[error("Unsupported snapshot version {0}")]
    UnsupportedSnapshotVersion(u32),

    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// What a catch-up call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatchUpReport {
    /// The ledger had no simulation and was initialised
    pub initialized: bool,

    /// Days started at the end of a previous day. Days begun by
    /// initialisation are not counted.
    pub days_simulated: usize,

    /// History was dropped because the vendor went dormant
    pub dormancy_reset: bool,
}

/// Cash ledger of one vendor
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use vendor_cashflow_core_rs::{Ledger, LedgerConfig};
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// let mut ledger = Ledger::new("blacksmith_1", LedgerConfig::default(), 7);
///
/// let cash = ledger.get_cash_on_hand(now);
/// assert!((8_000..24_000).contains(&cash));
///
/// ledger.add_transaction(now, 250, "player_a");
/// assert_eq!(ledger.get_cash_on_hand(now), cash + 250);
/// ```
#[derive(Debug, Clone)]
pub struct Ledger {
    vendor_id: String,
    config: LedgerConfig,

    /// Cash on hand before the first entry
    starting_balance: i64,

    /// Real and merged simulated entries, sorted by timestamp
    entries: Vec<LedgerEntry>,

    max_cash: MaxCashPolicy,

    /// Day currently being played out. `None` until the first catch-up.
    simulation: Option<DailySimulation>,

    /// Seed stream; every random consumer forks its own generator from it
    rng: RngManager,
}

impl Ledger {
    /// Create the ledger of a newly created vendor.
    ///
    /// Nothing is simulated yet: the first query initialises the cash flow
    /// relative to the instant it asks about.
    ///
    /// `config` must already have passed [`LedgerConfig::validate`]; an empty
    /// band makes the first simulated day panic. Use [`Ledger::try_new`] for
    /// configs that have not been checked.
    pub fn new(vendor_id: impl Into<String>, config: LedgerConfig, seed: u64) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            max_cash: MaxCashPolicy::new(&config),
            config,
            starting_balance: 0,
            entries: Vec::new(),
            simulation: None,
            rng: RngManager::new(seed),
        }
    }

    /// Like [`Ledger::new`], but rejects an invalid `config`.
    pub fn try_new(
        vendor_id: impl Into<String>,
        config: LedgerConfig,
        seed: u64,
    ) -> Result<Self, LedgerError> {
        config.validate()?;
        Ok(Self::new(vendor_id, config, seed))
    }

    pub(crate) fn from_parts(
        vendor_id: String,
        config: LedgerConfig,
        starting_balance: i64,
        entries: Vec<LedgerEntry>,
        max_cash: MaxCashPolicy,
        simulation: Option<DailySimulation>,
        rng: RngManager,
    ) -> Self {
        Self {
            vendor_id,
            config,
            starting_balance,
            entries,
            max_cash,
            simulation,
            rng,
        }
    }

    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn starting_balance(&self) -> i64 {
        self.starting_balance
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn simulation(&self) -> Option<&DailySimulation> {
        self.simulation.as_ref()
    }

    pub fn max_cash_policy(&self) -> &MaxCashPolicy {
        &self.max_cash
    }

    pub fn current_max_cash(&self) -> i64 {
        self.max_cash.current_max_cash()
    }

    pub fn next_max_cash_reset(&self) -> Timestamp {
        self.max_cash.next_reset()
    }

    pub fn rng_state(&self) -> u64 {
        self.rng.get_state()
    }

    /// Cash on hand at `t` after catching the simulation up to `t`.
    ///
    /// Entries stamped exactly `t` are included.
    pub fn get_cash_on_hand(&mut self, t: Timestamp) -> i64 {
        self.catch_up(t);
        self.balance_at(t)
    }

    /// Cash on hand at `t` as currently recorded, without simulating.
    pub fn balance_at(&self, t: Timestamp) -> i64 {
        latest_entry_at_or_before(&self.entries, t)
            .map_or(self.starting_balance, |i| self.entries[i].running_balance())
    }

    /// Record a real transaction and pin the balance to the ceiling.
    ///
    /// `amount` is positive when the vendor gains cash. Returns the
    /// corrective amount if the ceiling had to be enforced.
    pub fn add_transaction(&mut self, t: Timestamp, amount: i64, counterpart: &str) -> Option<i64> {
        self.catch_up(t);
        insert_sorted(
            &mut self.entries,
            LedgerEntry::new(t, amount, counterpart),
            self.starting_balance,
        );

        self.max_cash.refresh(t, &mut self.rng, &self.config);

        let cash = self.balance_at(t);
        let correction = self.max_cash.correction_for(cash);
        if let Some(adjustment) = correction {
            info!(
                vendor = %self.vendor_id,
                cash,
                max_cash = self.max_cash.current_max_cash(),
                adjustment,
                "cash on hand over ceiling, pinning"
            );
            insert_sorted(
                &mut self.entries,
                LedgerEntry::new(t, adjustment, counterpart),
                self.starting_balance,
            );
        }
        correction
    }

    /// Advance the simulation state so it is current as of `t`.
    ///
    /// On return the active day covers `t`, so a second call with the same
    /// `t` changes nothing.
    pub fn catch_up(&mut self, t: Timestamp) -> CatchUpReport {
        let mut report = CatchUpReport::default();
        if self.simulation.is_none() {
            self.initialize(t);
            report.initialized = true;
        } else {
            self.merge_active(t);
        }

        let mut idle_days = 0;
        loop {
            let (day_start, day_end) = match &self.simulation {
                Some(sim) if sim.end_time() < t => (sim.start_time(), sim.end_time()),
                _ => break,
            };

            let cash_at_end = self.balance_at(day_end);
            if self.config.in_target_band(cash_at_end) && !self.has_external_activity_since(day_start) {
                idle_days += 1;
                // At most one collapse per call: the fresh day starts less
                // than 24h before t, so at most two more days follow.
                if idle_days >= self.config.dormancy_threshold_days && !report.dormancy_reset {
                    self.collapse_dormant(t);
                    report.dormancy_reset = true;
                    idle_days = 0;
                    continue;
                }
            } else {
                idle_days = 0;
            }

            let seed = self.rng.next_seed();
            self.simulation = Some(DailySimulation::generate(
                &self.vendor_id,
                day_end,
                cash_at_end,
                self.config.transactions_per_day,
                seed,
                &self.config,
            ));
            report.days_simulated += 1;
            debug!(
                vendor = %self.vendor_id,
                start = %day_end,
                starting_cash = cash_at_end,
                seed,
                "simulating next cash day"
            );
            self.merge_active(t);
        }
        report
    }

    /// True if any entry at or after `since` was not produced by this
    /// vendor's own simulation.
    pub fn has_external_activity_since(&self, since: Timestamp) -> bool {
        let first = self.entries.partition_point(|e| e.timestamp() < since);
        self.entries[first..]
            .iter()
            .any(|e| e.counterpart() != self.vendor_id)
    }

    fn initialize(&mut self, t: Timestamp) {
        let mut rng = self.rng.fork();
        self.starting_balance = rng.range(self.config.target_cash_low, self.config.target_cash_high);

        // Start strictly in the past, at a random point so vendors' days are
        // not in lockstep.
        let minutes_back = rng.range(1, 24 * 60);
        let start = t - Duration::minutes(minutes_back);

        let seed = self.rng.next_seed();
        self.simulation = Some(DailySimulation::generate(
            &self.vendor_id,
            start,
            self.starting_balance,
            self.config.transactions_per_day,
            seed,
            &self.config,
        ));
        debug!(
            vendor = %self.vendor_id,
            starting_balance = self.starting_balance,
            start = %start,
            seed,
            "cash simulation initialised"
        );

        self.merge_active(t);
    }

    fn collapse_dormant(&mut self, t: Timestamp) {
        info!(
            vendor = %self.vendor_id,
            dropped_entries = self.entries.len(),
            "vendor dormant, restarting cash history"
        );
        self.entries.clear();
        self.simulation = None;
        self.initialize(t);
    }

    /// Truncate to the active day's start, then merge its entries up to `up_to`.
    fn merge_active(&mut self, up_to: Timestamp) {
        let Some(sim) = self.simulation.as_ref() else {
            return;
        };

        let before = self.entries.len();
        self.starting_balance = truncate_before(&mut self.entries, sim.start_time(), self.starting_balance);
        if self.entries.len() != before {
            debug!(
                vendor = %self.vendor_id,
                dropped = before - self.entries.len(),
                starting_balance = self.starting_balance,
                "ledger truncated"
            );
        }

        self.entries = merge_simulated(&self.entries, sim.entries(), up_to, self.starting_balance);
    }
}
