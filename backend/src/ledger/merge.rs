//! Merge and truncate engine
//!
//! Keeps a vendor's real ledger bounded and consistent with its simulated
//! days:
//!
//! - [`merge_simulated`] folds the visible part of a simulated day into the
//!   real entries (sorted merge, idempotent)
//! - [`truncate_before`] drops entries older than the active simulation and
//!   folds their net effect into the starting balance
//! - [`insert_sorted`] places one real transaction
//!
//! # Critical Invariants
//!
//! 1. Output is sorted by timestamp whenever the inputs are
//! 2. `running_balance[i] = running_balance[i-1] + amount[i]`, seeded by the
//!    starting balance
//! 3. Merging the same simulation twice changes nothing

use crate::core::time::Timestamp;
use crate::models::entry::{
    is_sorted_by_time, latest_entry_at_or_before, latest_entry_strictly_before,
    recompute_running_balances, recompute_running_balances_from, LedgerEntry,
};

/// Interleave the simulated entries stamped at or before `up_to` into
/// `existing`, then recompute running balances from `starting_balance`.
///
/// Within a group of entries sharing one timestamp, a simulated entry is a
/// duplicate only if an existing entry of that group has the same amount and
/// counterpart (each existing entry absorbs at most one duplicate). Anything
/// else is simultaneous but distinct and is kept.
///
/// Both inputs must be sorted by timestamp. Unsorted input is a caller bug
/// and is not repaired.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use vendor_cashflow_core_rs::ledger::merge::merge_simulated;
/// use vendor_cashflow_core_rs::LedgerEntry;
///
/// let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let real = vec![LedgerEntry::new(t0 + Duration::hours(2), 500, "player_a")];
/// let sim = vec![
///     LedgerEntry::new(t0 + Duration::hours(1), -100, "vendor"),
///     LedgerEntry::new(t0 + Duration::hours(5), -100, "vendor"),
/// ];
///
/// let merged = merge_simulated(&real, &sim, t0 + Duration::hours(3), 1_000);
/// assert_eq!(merged.len(), 2); // the 5h entry is still in the future
/// assert_eq!(merged[1].running_balance(), 1_400);
///
/// let again = merge_simulated(&merged, &sim, t0 + Duration::hours(3), 1_000);
/// assert_eq!(again, merged);
/// ```
pub fn merge_simulated(
    existing: &[LedgerEntry],
    simulated: &[LedgerEntry],
    up_to: Timestamp,
    starting_balance: i64,
) -> Vec<LedgerEntry> {
    debug_assert!(is_sorted_by_time(existing), "existing ledger must be sorted");
    debug_assert!(is_sorted_by_time(simulated), "simulated ledger must be sorted");

    let eligible: &[LedgerEntry] = match latest_entry_at_or_before(simulated, up_to) {
        Some(last) => &simulated[..=last],
        None => &[],
    };

    let mut merged = Vec::with_capacity(existing.len() + eligible.len());
    let (mut i, mut j) = (0, 0);
    loop {
        match (existing.get(i), eligible.get(j)) {
            (Some(real), Some(sim)) if real.timestamp() < sim.timestamp() => {
                merged.push(real.clone());
                i += 1;
            }
            (Some(real), Some(sim)) if real.timestamp() > sim.timestamp() => {
                merged.push(sim.clone());
                j += 1;
            }
            (Some(real), Some(_)) => {
                let t = real.timestamp();
                let real_end = i + count_at(&existing[i..], t);
                let sim_end = j + count_at(&eligible[j..], t);
                merge_same_instant(&existing[i..real_end], &eligible[j..sim_end], &mut merged);
                i = real_end;
                j = sim_end;
            }
            (Some(real), None) => {
                merged.push(real.clone());
                i += 1;
            }
            (None, Some(sim)) => {
                merged.push(sim.clone());
                j += 1;
            }
            (None, None) => break,
        }
    }

    recompute_running_balances(&mut merged, starting_balance);
    merged
}

/// Length of the leading run of entries stamped exactly `t`
fn count_at(entries: &[LedgerEntry], t: Timestamp) -> usize {
    entries.iter().take_while(|e| e.timestamp() == t).count()
}

fn merge_same_instant(real: &[LedgerEntry], sim: &[LedgerEntry], out: &mut Vec<LedgerEntry>) {
    out.extend_from_slice(real);
    let mut absorbed = vec![false; real.len()];
    for candidate in sim {
        let duplicate = real
            .iter()
            .enumerate()
            .find(|(k, e)| !absorbed[*k] && e.same_movement(candidate))
            .map(|(k, _)| k);
        match duplicate {
            Some(k) => absorbed[k] = true,
            None => out.push(candidate.clone()),
        }
    }
}

/// Drop every entry stamped strictly before `start` and return the new
/// starting balance: the running balance of the last dropped entry, or
/// `starting_balance` unchanged when nothing was dropped.
///
/// Balances observed at any instant `>= start` are the same before and after.
pub fn truncate_before(entries: &mut Vec<LedgerEntry>, start: Timestamp, starting_balance: i64) -> i64 {
    match latest_entry_strictly_before(entries, start) {
        Some(last_old) => {
            let new_starting_balance = entries[last_old].running_balance();
            entries.drain(..=last_old);
            new_starting_balance
        }
        None => starting_balance,
    }
}

/// Insert `entry` after every entry stamped at or before it and rebalance the
/// tail. Returns the index it landed at.
pub fn insert_sorted(entries: &mut Vec<LedgerEntry>, entry: LedgerEntry, starting_balance: i64) -> usize {
    let t = entry.timestamp();
    let pos = entries.partition_point(|e| e.timestamp() <= t);
    entries.insert(pos, entry);

    let balance_before = match pos {
        0 => starting_balance,
        _ => entries[pos - 1].running_balance(),
    };
    recompute_running_balances_from(entries, pos, balance_before);
    pos
}
