//! Entry search helpers and their boundary behaviour
//!
//! `latest_entry_at_or_before` counts an entry stamped exactly `t`;
//! `latest_entry_strictly_before` does not. Both directions are pinned here
//! so neither can drift toward the other unnoticed.

use chrono::{Duration, TimeZone, Utc};
use vendor_cashflow_core_rs::models::entry::{
    is_sorted_by_time, latest_entry_at_or_before, latest_entry_strictly_before,
    recompute_running_balances,
};
use vendor_cashflow_core_rs::{LedgerEntry, Timestamp};

fn at(secs: i64) -> Timestamp {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(secs)
}

fn ledger() -> Vec<LedgerEntry> {
    let mut entries = vec![
        LedgerEntry::new(at(10), 100, "v"),
        LedgerEntry::new(at(20), -50, "player"),
        LedgerEntry::new(at(20), 25, "v"),
        LedgerEntry::new(at(30), 5, "v"),
    ];
    recompute_running_balances(&mut entries, 1_000);
    entries
}

#[test]
fn test_at_or_before_includes_exact_match() {
    let entries = ledger();
    assert_eq!(latest_entry_at_or_before(&entries, at(10)), Some(0));
    // Last of the equal-timestamp group
    assert_eq!(latest_entry_at_or_before(&entries, at(20)), Some(2));
    assert_eq!(latest_entry_at_or_before(&entries, at(30)), Some(3));
}

#[test]
fn test_strictly_before_excludes_exact_match() {
    let entries = ledger();
    assert_eq!(latest_entry_strictly_before(&entries, at(10)), None);
    assert_eq!(latest_entry_strictly_before(&entries, at(20)), Some(0));
    assert_eq!(latest_entry_strictly_before(&entries, at(30)), Some(2));
}

#[test]
fn test_helpers_agree_between_timestamps() {
    let entries = ledger();
    for t in [at(15), at(25), at(1_000)] {
        assert_eq!(
            latest_entry_at_or_before(&entries, t),
            latest_entry_strictly_before(&entries, t)
        );
    }
}

#[test]
fn test_before_first_entry() {
    let entries = ledger();
    assert_eq!(latest_entry_at_or_before(&entries, at(9)), None);
    assert_eq!(latest_entry_strictly_before(&entries, at(9)), None);
}

#[test]
fn test_empty_ledger() {
    assert_eq!(latest_entry_at_or_before(&[], at(0)), None);
    assert_eq!(latest_entry_strictly_before(&[], at(0)), None);
}

#[test]
fn test_running_balance_recurrence() {
    let entries = ledger();
    let balances: Vec<i64> = entries.iter().map(|e| e.running_balance()).collect();
    assert_eq!(balances, vec![1_100, 1_050, 1_075, 1_080]);
}

#[test]
fn test_negative_balances_are_legal() {
    let mut entries = vec![LedgerEntry::new(at(0), -5_000, "player")];
    recompute_running_balances(&mut entries, 1_000);
    assert_eq!(entries[0].running_balance(), -4_000);
}

#[test]
fn test_sortedness_check() {
    assert!(is_sorted_by_time(&ledger()));
    let unsorted = vec![LedgerEntry::new(at(5), 1, "v"), LedgerEntry::new(at(4), 1, "v")];
    assert!(!is_sorted_by_time(&unsorted));
}
