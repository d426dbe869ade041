//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, reproducible draws.
//! All randomness in the ledger engine goes through this module: a vendor's
//! ledger owns one seed stream, and every daily simulation, max-cash re-roll
//! and balance draw builds its own local generator from a seed taken off
//! that stream.

mod xorshift;

pub use xorshift::RngManager;
