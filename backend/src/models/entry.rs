//! Ledger entry model
//!
//! One signed cash movement for a vendor:
//! - timestamp of the movement
//! - amount (i64 gold, positive = vendor gained cash)
//! - counterpart (the other party; the vendor itself for simulated entries)
//! - running balance after this entry (derived)
//!
//! Every sequence of entries in this crate is sorted by timestamp
//! (non-decreasing). The helpers below assume that and never repair it.

use crate::core::time::{format_seconds, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cash movement in a vendor ledger
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use vendor_cashflow_core_rs::LedgerEntry;
///
/// let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
/// let sale = LedgerEntry::new(t, 500, "player_a");
/// assert_eq!(sale.amount(), 500);
/// assert_eq!(sale.counterpart(), "player_a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    timestamp: Timestamp,
    amount: i64,
    counterpart: String,

    /// Cash on hand right after this entry. Rewritten whenever an earlier
    /// entry or the ledger's starting balance changes.
    running_balance: i64,
}

impl LedgerEntry {
    /// New entry with a zero running balance; the ledger fills it in on insert.
    pub fn new(timestamp: Timestamp, amount: i64, counterpart: impl Into<String>) -> Self {
        Self {
            timestamp,
            amount,
            counterpart: counterpart.into(),
            running_balance: 0,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn counterpart(&self) -> &str {
        &self.counterpart
    }

    pub fn running_balance(&self) -> i64 {
        self.running_balance
    }

    pub(crate) fn set_running_balance(&mut self, balance: i64) {
        self.running_balance = balance;
    }

    /// Same logical movement: time, amount and counterpart match.
    /// Running balance is derived and deliberately ignored.
    pub fn same_movement(&self, other: &LedgerEntry) -> bool {
        self.timestamp == other.timestamp
            && self.amount == other.amount
            && self.counterpart == other.counterpart
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{time: {}, amount: {}, counterpart: {}, balance: {}}}",
            format_seconds(&self.timestamp),
            self.amount,
            self.counterpart,
            self.running_balance
        )
    }
}

/// Index of the last entry stamped at or before `t`, scanning forward from
/// the earliest entry. `None` when every entry is strictly after `t`.
///
/// Note the boundary: an entry stamped exactly `t` counts.
/// [`latest_entry_strictly_before`] excludes it.
pub fn latest_entry_at_or_before(entries: &[LedgerEntry], t: Timestamp) -> Option<usize> {
    let first = entries.first()?;
    if first.timestamp > t {
        return None;
    }
    for (i, entry) in entries.iter().enumerate().skip(1) {
        if entry.timestamp > t {
            return Some(i - 1);
        }
    }
    Some(entries.len() - 1)
}

/// Index of the latest entry stamped strictly before `t`, scanning backward
/// from the newest entry. `None` when every entry is at or after `t`.
pub fn latest_entry_strictly_before(entries: &[LedgerEntry], t: Timestamp) -> Option<usize> {
    entries.iter().rposition(|entry| entry.timestamp < t)
}

/// Rewrite running balances from `start` onward. `balance_before` is the
/// balance just before `entries[start]`.
pub fn recompute_running_balances_from(
    entries: &mut [LedgerEntry],
    start: usize,
    balance_before: i64,
) {
    let mut balance = balance_before;
    for entry in entries.iter_mut().skip(start) {
        // Negative balances are legal: vendors can go into debt.
        balance = balance.saturating_add(entry.amount);
        entry.set_running_balance(balance);
    }
}

/// Rewrite every running balance forward from `starting_balance`
pub fn recompute_running_balances(entries: &mut [LedgerEntry], starting_balance: i64) {
    recompute_running_balances_from(entries, 0, starting_balance);
}

pub fn is_sorted_by_time(entries: &[LedgerEntry]) -> bool {
    entries.windows(2).all(|w| w[0].timestamp <= w[1].timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn at(secs: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
    }

    #[test]
    fn test_recompute_running_balances() {
        let mut entries = vec![
            LedgerEntry::new(at(0), 100, "a"),
            LedgerEntry::new(at(1), -250, "b"),
            LedgerEntry::new(at(2), 50, "c"),
        ];
        recompute_running_balances(&mut entries, 1_000);
        let balances: Vec<i64> = entries.iter().map(|e| e.running_balance()).collect();
        assert_eq!(balances, vec![1_100, 850, 900]);
    }

    #[test]
    fn test_recompute_allows_debt() {
        let mut entries = vec![LedgerEntry::new(at(0), -500, "a")];
        recompute_running_balances(&mut entries, 100);
        assert_eq!(entries[0].running_balance(), -400);
    }

    #[test]
    fn test_recompute_saturates_at_limits() {
        let mut entries = vec![
            LedgerEntry::new(at(0), i64::MAX, "a"),
            LedgerEntry::new(at(1), -10, "b"),
        ];
        recompute_running_balances(&mut entries, 100);
        assert_eq!(entries[0].running_balance(), i64::MAX);
        assert_eq!(entries[1].running_balance(), i64::MAX - 10);
    }

    #[test]
    fn test_same_movement_ignores_running_balance() {
        let mut a = LedgerEntry::new(at(5), 10, "x");
        let b = LedgerEntry::new(at(5), 10, "x");
        a.set_running_balance(999);
        assert!(a.same_movement(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn test_is_sorted_by_time() {
        let sorted = vec![
            LedgerEntry::new(at(0), 1, "a"),
            LedgerEntry::new(at(0), 2, "a"),
            LedgerEntry::new(at(3), 3, "a"),
        ];
        assert!(is_sorted_by_time(&sorted));
        let unsorted = vec![LedgerEntry::new(at(3), 1, "a"), LedgerEntry::new(at(1), 1, "a")];
        assert!(!is_sorted_by_time(&unsorted));
    }
}
