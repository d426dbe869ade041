//! Vendor Cash-Flow Core - Rust Engine
//!
//! Believable cash on hand for in-game vendors that nobody is watching.
//!
//! # Architecture
//!
//! - **core**: Timestamps and clocks
//! - **config**: Ledger tunables
//! - **models**: Ledger entries and simulated days
//! - **ledger**: Per-vendor ledger, catch-up, merge, max-cash ceiling, checkpoints
//! - **market**: All vendors of a world, trade surface
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All cash values are i64 (gold pieces)
//! 2. All randomness is deterministic (seeded RNG per vendor)
//! 3. Simulated days are stored as four scalars and regenerated on load

pub mod config;
pub mod core;
pub mod ledger;
pub mod market;
pub mod models;
pub mod rng;

pub use crate::config::LedgerConfig;
pub use crate::core::time::{Clock, ManualClock, SystemClock, Timestamp};
pub use ledger::{
    compute_config_hash, CatchUpReport, DisplayPage, EntrySnapshot, Ledger, LedgerError,
    LedgerSnapshot, MaxCashPolicy, SimulationSnapshot,
};
pub use market::{
    Market, MarketError, MarketSnapshot, TradeReceipt, VendorSnapshot, MAX_TRADE_PRICE,
};
pub use models::{entry::LedgerEntry, simulation::DailySimulation};
pub use rng::RngManager;

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn vendor_cashflow_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::market::PyMarket>()?;
    Ok(())
}
