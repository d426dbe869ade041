//! Vendor cash ledger: merge/truncate engine, max-cash policy, the ledger
//! aggregate with its catch-up scheduler, display and checkpointing.

pub mod checkpoint;
pub mod display;
pub mod max_cash;
pub mod merge;
pub mod vendor_ledger;

pub use checkpoint::{compute_config_hash, EntrySnapshot, LedgerSnapshot, SimulationSnapshot};
pub use display::DisplayPage;
pub use max_cash::MaxCashPolicy;
pub use vendor_ledger::{CatchUpReport, Ledger, LedgerError};
