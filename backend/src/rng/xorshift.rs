//! xorshift64* random number generator
//!
//! xorshift64* passes TestU01's BigCrush with 64 bits of state, which is all
//! a vendor needs to regenerate a simulated day from a persisted seed.
//!
//! # Determinism
//!
//! Same seed → same sequence. A `DailySimulation` is persisted as four
//! scalars and rebuilt from its seed on load, so this property is what keeps
//! a restored ledger identical to the one that was saved.

use serde::{Deserialize, Serialize};

/// Multiplier from Vigna's xorshift64* paper.
const XORSHIFT_MULTIPLIER: u64 = 0x2545F4914F6CDD1D;

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use vendor_cashflow_core_rs::RngManager;
///
/// let mut stream = RngManager::new(12345);
/// let mut day_rng = stream.fork();
/// let target = day_rng.range(8_000, 24_000); // [8000, 24000)
/// assert!((8_000..24_000).contains(&target));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a generator from a seed. A zero seed is remapped to 1 because
    /// xorshift never leaves the all-zero state.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Advance the state and return the next raw value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(XORSHIFT_MULTIPLIER)
    }

    /// Draw a seed for a new, independent generator.
    ///
    /// This is how the ledger hands randomness to a daily simulation: the
    /// seed is stored with the simulation and fed back to [`RngManager::new`]
    /// when the day has to be regenerated.
    pub fn next_seed(&mut self) -> u64 {
        self.next()
    }

    /// Build a local generator seeded from this stream
    pub fn fork(&mut self) -> RngManager {
        RngManager::new(self.next_seed())
    }

    /// Uniform integer in `[min, max)`
    ///
    /// # Panics
    /// Panics if `min >= max`
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let value = self.next();
        let range_size = max.abs_diff(min);
        min.wrapping_add((value % range_size) as i64)
    }

    /// Uniform float in `[0.0, 1.0)`
    pub fn next_f64(&mut self) -> f64 {
        let value = self.next();
        (value >> 11) as f64 * (1.0 / ((1u64 << 53) as f64))
    }

    /// Uniform float in `[-1.0, 1.0)`, used for symmetric jitter such as the
    /// spread on a simulated day's length.
    pub fn next_signed_unit(&mut self) -> f64 {
        self.next_f64() * 2.0 - 1.0
    }

    /// Current internal state, persisted so a restored stream continues the
    /// same sequence.
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
