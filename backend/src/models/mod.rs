//! Domain models for the vendor cash engine

pub mod entry;
pub mod simulation;

// Re-exports
pub use entry::{
    is_sorted_by_time, latest_entry_at_or_before, latest_entry_strictly_before,
    recompute_running_balances, LedgerEntry,
};
pub use simulation::DailySimulation;
