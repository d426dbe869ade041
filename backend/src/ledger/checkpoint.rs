//! Checkpoint - Save/Load Ledger State
//!
//! A ledger persists as plain values. Derived data is never stored:
//! running balances are recomputed on load and the active day's entries
//! are regenerated from its four scalars.
//!
//! # Critical Invariants
//!
//! - **Determinism**: a restored ledger answers every query exactly like the
//!   ledger that was saved, and draws the same future random numbers
//! - **Sortedness**: snapshots with unsorted entries are rejected, not repaired
//! - **Config Matching**: market snapshots only load with the config they
//!   were taken with (see [`compute_config_hash`])

use crate::config::LedgerConfig;
use crate::core::time::Timestamp;
use crate::ledger::max_cash::MaxCashPolicy;
use crate::ledger::vendor_ledger::{Ledger, LedgerError};
use crate::models::entry::{is_sorted_by_time, recompute_running_balances, LedgerEntry};
use crate::models::simulation::DailySimulation;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const LEDGER_SNAPSHOT_VERSION: u32 = 1;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Persisted ledger state, in on-disk field order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub version: u32,
    pub starting_balance: i64,
    pub entries: Vec<EntrySnapshot>,
    pub current_max_cash: i64,
    pub next_max_cash_reset: Timestamp,

    /// Present iff the ledger had an active simulation
    pub simulation: Option<SimulationSnapshot>,

    /// Seed stream state (CRITICAL for determinism after restore)
    #[serde(default)]
    pub rng_state: u64,
}

/// Entry without its running balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub timestamp: Timestamp,
    pub amount: i64,
    pub counterpart: String,
}

/// The four scalars a simulated day regenerates from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub start_time: Timestamp,
    pub starting_cash: i64,
    pub transaction_count: usize,
    pub seed: u64,
}

impl From<&LedgerEntry> for EntrySnapshot {
    fn from(entry: &LedgerEntry) -> Self {
        EntrySnapshot {
            timestamp: entry.timestamp(),
            amount: entry.amount(),
            counterpart: entry.counterpart().to_string(),
        }
    }
}

impl From<EntrySnapshot> for LedgerEntry {
    fn from(snapshot: EntrySnapshot) -> Self {
        LedgerEntry::new(snapshot.timestamp, snapshot.amount, snapshot.counterpart)
    }
}

impl From<&DailySimulation> for SimulationSnapshot {
    fn from(sim: &DailySimulation) -> Self {
        SimulationSnapshot {
            start_time: sim.start_time(),
            starting_cash: sim.starting_cash(),
            transaction_count: sim.transaction_count(),
            seed: sim.seed(),
        }
    }
}

impl From<&Ledger> for LedgerSnapshot {
    fn from(ledger: &Ledger) -> Self {
        LedgerSnapshot {
            version: LEDGER_SNAPSHOT_VERSION,
            starting_balance: ledger.starting_balance(),
            entries: ledger.entries().iter().map(EntrySnapshot::from).collect(),
            current_max_cash: ledger.current_max_cash(),
            next_max_cash_reset: ledger.next_max_cash_reset(),
            simulation: ledger.simulation().map(SimulationSnapshot::from),
            rng_state: ledger.rng_state(),
        }
    }
}

impl LedgerSnapshot {
    /// Rebuild the ledger of `vendor_id`.
    pub fn restore(self, vendor_id: impl Into<String>, config: LedgerConfig) -> Result<Ledger, LedgerError> {
        config.validate()?;
        if self.version != LEDGER_SNAPSHOT_VERSION {
            return Err(LedgerError::UnsupportedSnapshotVersion(self.version));
        }
        let vendor_id = vendor_id.into();

        let mut entries: Vec<LedgerEntry> = self.entries.into_iter().map(LedgerEntry::from).collect();
        if !is_sorted_by_time(&entries) {
            return Err(LedgerError::CorruptSnapshot(format!(
                "entries of vendor {} are not sorted by timestamp",
                vendor_id
            )));
        }
        recompute_running_balances(&mut entries, self.starting_balance);

        let simulation = match self.simulation {
            Some(sim) if sim.transaction_count == 0 => {
                return Err(LedgerError::CorruptSnapshot(format!(
                    "simulation of vendor {} has zero transactions",
                    vendor_id
                )));
            }
            Some(sim) => Some(DailySimulation::generate(
                &vendor_id,
                sim.start_time,
                sim.starting_cash,
                sim.transaction_count,
                sim.seed,
                &config,
            )),
            None => None,
        };

        Ok(Ledger::from_parts(
            vendor_id,
            config,
            self.starting_balance,
            entries,
            MaxCashPolicy::from_parts(self.current_max_cash, self.next_max_cash_reset),
            simulation,
            RngManager::new(self.rng_state),
        ))
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string(self).map_err(|e| {
            LedgerError::SerializationError(format!("Ledger serialization failed: {}", e))
        })
    }

    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(json).map_err(|e| {
            LedgerError::SerializationError(format!("Ledger deserialization failed: {}", e))
        })
    }
}

impl Ledger {
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot::from(self)
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Deterministic SHA256 hash of a config.
///
/// Uses canonical JSON with sorted keys so field order in the source
/// document never changes the hash.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, LedgerError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        LedgerError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        LedgerError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
