//! Max-cash ceiling tests
//!
//! The ceiling is re-rolled lazily inside its band, on a schedule that
//! drifts between the configured minimum and maximum number of days.

use chrono::{Duration, TimeZone, Utc};
use vendor_cashflow_core_rs::ledger::checkpoint::LEDGER_SNAPSHOT_VERSION;
use vendor_cashflow_core_rs::{
    Ledger, LedgerConfig, LedgerSnapshot, MaxCashPolicy, RngManager, SimulationSnapshot, Timestamp,
};

fn t() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
}

#[test]
fn test_fresh_policy_sits_at_band_floor() {
    let config = LedgerConfig::default();
    let policy = MaxCashPolicy::new(&config);
    assert_eq!(policy.current_max_cash(), config.max_cash_low);
    assert!(policy.next_reset() < t());
}

#[test]
fn test_no_reroll_before_reset() {
    let config = LedgerConfig::default();
    let mut policy = MaxCashPolicy::from_parts(45_000, t() + Duration::days(2));
    let mut stream = RngManager::new(3);
    let state = stream.get_state();

    assert!(!policy.refresh(t(), &mut stream, &config));
    assert_eq!(policy.current_max_cash(), 45_000);
    // Nothing was drawn.
    assert_eq!(stream.get_state(), state);
}

#[test]
fn test_reroll_at_reset_instant() {
    let config = LedgerConfig::default();
    let mut policy = MaxCashPolicy::from_parts(45_000, t());
    let mut stream = RngManager::new(3);

    assert!(policy.refresh(t(), &mut stream, &config));
    assert!((config.max_cash_low..config.max_cash_high).contains(&policy.current_max_cash()));
    let interval = policy.next_reset() - t();
    assert!(interval >= Duration::days(config.min_days_before_max_cash_reset));
    assert!(interval <= Duration::days(config.max_days_before_max_cash_reset));
}

#[test]
fn test_ceiling_always_in_band() {
    let config = LedgerConfig::default();
    let mut stream = RngManager::new(11);
    let mut policy = MaxCashPolicy::new(&config);
    for day in 0..365 {
        policy.refresh(t() + Duration::days(day), &mut stream, &config);
        assert!((config.max_cash_low..config.max_cash_high).contains(&policy.current_max_cash()));
    }
}

#[test]
fn test_resets_follow_interval_bounds() {
    let config = LedgerConfig::default();
    let mut stream = RngManager::new(12);
    let mut policy = MaxCashPolicy::from_parts(50_000, t());

    for _ in 0..50 {
        let due = policy.next_reset();
        assert!(policy.refresh(due, &mut stream, &config));
        let interval = policy.next_reset() - due;
        assert!(interval >= Duration::days(config.min_days_before_max_cash_reset));
        assert!(interval <= Duration::days(config.max_days_before_max_cash_reset));
    }
}

#[test]
fn test_far_behind_schedule_catches_up_cheaply() {
    let config = LedgerConfig::default();
    let mut policy = MaxCashPolicy::from_parts(50_000, t());
    let mut stream = RngManager::new(13);
    let much_later = t() + Duration::days(3_650);

    assert!(policy.refresh(much_later, &mut stream, &config));
    assert!(policy.next_reset() > much_later);
    assert!(policy.next_reset() <= much_later + Duration::days(config.max_days_before_max_cash_reset));
}

#[test]
fn test_same_stream_same_schedule() {
    let config = LedgerConfig::default();
    let mut a = MaxCashPolicy::new(&config);
    let mut b = MaxCashPolicy::new(&config);
    let mut stream_a = RngManager::new(77);
    let mut stream_b = RngManager::new(77);
    for day in [0, 9, 20, 45, 400] {
        a.refresh(t() + Duration::days(day), &mut stream_a, &config);
        b.refresh(t() + Duration::days(day), &mut stream_b, &config);
        assert_eq!(a, b);
    }
}

#[test]
fn test_correction_amount() {
    let policy = MaxCashPolicy::from_parts(40_000, t());
    assert_eq!(policy.correction_for(40_300), Some(-300));
    assert_eq!(policy.correction_for(40_000), None);
    assert_eq!(policy.correction_for(-5), None);
}

#[test]
fn test_transaction_after_reset_rerolls_before_pinning() {
    let config = LedgerConfig {
        max_daily_inflow: 1,
        max_daily_outflow: 1,
        ..Default::default()
    };
    let mut ledger = LedgerSnapshot {
        version: LEDGER_SNAPSHOT_VERSION,
        starting_balance: 70_000,
        entries: Vec::new(),
        current_max_cash: 40_000,
        next_max_cash_reset: t() - Duration::days(1),
        simulation: Some(SimulationSnapshot {
            start_time: t() - Duration::hours(1),
            starting_cash: 70_000,
            transaction_count: 7,
            seed: 1,
        }),
        rng_state: 5,
    }
    .restore("v", config)
    .unwrap();

    let correction = ledger.add_transaction(t(), 100, "player_a");
    let ceiling = ledger.current_max_cash();
    assert!((config.max_cash_low..config.max_cash_high).contains(&ceiling));
    assert!(ledger.next_max_cash_reset() > t());
    assert_eq!(correction, Some(ceiling - 70_100));
    assert_eq!(ledger.get_cash_on_hand(t()), ceiling);
}

#[test]
fn test_first_transaction_of_new_vendor_rolls_ceiling() {
    let mut ledger = Ledger::new("v", LedgerConfig::default(), 21);
    let stale = ledger.next_max_cash_reset();
    ledger.add_transaction(t(), 10, "player_a");
    assert!(ledger.next_max_cash_reset() > stale);
    assert!(ledger.next_max_cash_reset() > t());
}

#[test]
fn test_queries_never_touch_the_ceiling() {
    let mut ledger = Ledger::new("v", LedgerConfig::default(), 21);
    let before = ledger.max_cash_policy().clone();
    ledger.get_cash_on_hand(t());
    ledger.get_cash_on_hand(t() + Duration::days(30));
    assert_eq!(ledger.max_cash_policy(), &before);
}
