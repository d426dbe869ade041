//! Time handling for the ledger engine
//!
//! Ledgers never read the clock themselves. Every query takes the instant it
//! is asked about, and the caller obtains that instant from a [`Clock`].
//! Production code uses [`SystemClock`]; simulations and tests drive a
//! [`ManualClock`] forward explicitly.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Instant at which a cash movement happens
pub type Timestamp = DateTime<Utc>;

pub const SECONDS_PER_MINUTE: i64 = 60;
pub const SECONDS_PER_HOUR: i64 = 60 * SECONDS_PER_MINUTE;
pub const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Source of "now" for callers of the ledger
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock backed by [`Utc::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock that only moves when told to
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use vendor_cashflow_core_rs::core::time::{Clock, ManualClock};
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let mut clock = ManualClock::new(start);
/// clock.advance(Duration::hours(25));
/// assert_eq!(clock.now(), start + Duration::hours(25));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualClock {
    now: Timestamp,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self { now: start }
    }

    /// Move the clock forward
    ///
    /// # Panics
    /// Panics if `by` is negative; the clock is monotonic.
    pub fn advance(&mut self, by: Duration) {
        assert!(by >= Duration::zero(), "clock cannot move backwards");
        self.now += by;
    }

    pub fn set(&mut self, to: Timestamp) {
        assert!(to >= self.now, "clock cannot move backwards");
        self.now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now
    }
}

/// Whole days as a duration
pub fn days(n: i64) -> Duration {
    Duration::seconds(n * SECONDS_PER_DAY)
}

/// Fractional seconds as a duration, rounded to the millisecond
pub fn seconds_f64(secs: f64) -> Duration {
    Duration::milliseconds((secs * 1000.0).round() as i64)
}

/// Fixed-width `yyyy-mm-dd.HH:MM` rendering used on ledger pages
pub fn format_minutes(t: &Timestamp) -> String {
    t.format("%Y-%m-%d.%H:%M").to_string()
}

/// `yyyy-mm-dd.HH:MM:SS` rendering used in text dumps
pub fn format_seconds(t: &Timestamp) -> String {
    t.format("%Y-%m-%d.%H:%M:%S").to_string()
}
