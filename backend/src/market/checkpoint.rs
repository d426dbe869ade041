//! Market checkpoints
//!
//! A market snapshot is the config hash, the market's seed stream and every
//! vendor's [`LedgerSnapshot`]. The config itself is not stored: the host
//! supplies it again on restore and the hash guards against loading a save
//! under different tunables.

use crate::config::LedgerConfig;
use crate::ledger::{compute_config_hash, LedgerError, LedgerSnapshot};
use crate::market::engine::{Market, MarketError};
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub config_hash: String,
    pub rng_state: u64,

    /// Sorted by vendor id
    pub vendors: Vec<VendorSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSnapshot {
    pub vendor_id: String,
    pub ledger: LedgerSnapshot,
}

impl Market {
    pub fn snapshot(&self) -> Result<MarketSnapshot, MarketError> {
        Ok(MarketSnapshot {
            config_hash: compute_config_hash(self.config())?,
            rng_state: self.rng_state(),
            vendors: self
                .vendors()
                .iter()
                .map(|(vendor_id, ledger)| VendorSnapshot {
                    vendor_id: vendor_id.clone(),
                    ledger: ledger.snapshot(),
                })
                .collect(),
        })
    }

    pub fn to_json(&self) -> Result<String, MarketError> {
        Ok(self.snapshot()?.to_json()?)
    }

    pub fn from_json(json: &str, config: LedgerConfig) -> Result<Self, MarketError> {
        MarketSnapshot::from_json(json)?.restore(config)
    }
}

impl MarketSnapshot {
    /// Rebuild the market under `config`, which must hash to the saved value.
    pub fn restore(self, config: LedgerConfig) -> Result<Market, MarketError> {
        config.validate()?;
        let actual = compute_config_hash(&config)?;
        if actual != self.config_hash {
            return Err(LedgerError::ConfigMismatch {
                expected: self.config_hash,
                actual,
            }
            .into());
        }

        let mut vendors = BTreeMap::new();
        for vendor in self.vendors {
            if vendors.contains_key(&vendor.vendor_id) {
                return Err(MarketError::DuplicateVendor(vendor.vendor_id));
            }
            let ledger = vendor.ledger.restore(vendor.vendor_id.clone(), config)?;
            vendors.insert(vendor.vendor_id, ledger);
        }

        Ok(Market::from_parts(config, vendors, RngManager::new(self.rng_state)))
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        serde_json::to_string_pretty(self).map_err(|e| {
            LedgerError::SerializationError(format!("Market serialization failed: {}", e))
        })
    }

    pub fn from_json(json: &str) -> Result<Self, LedgerError> {
        serde_json::from_str(json).map_err(|e| {
            LedgerError::SerializationError(format!("Market deserialization failed: {}", e))
        })
    }
}
