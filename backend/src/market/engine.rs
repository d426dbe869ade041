//! Market Engine
//!
//! ```text
//! record_sale(vendor, customer, price, t)     customer buys goods  → +price
//! record_purchase(vendor, seller, price, t)   vendor buys goods    → -price
//!                                             (refused when the vendor
//!                                              cannot afford it)
//! ```
//!
//! Vendors are created explicitly with [`Market::open_vendor`] or
//! [`Market::spawn_vendor`]; lookups never create a ledger as a side effect.

use crate::config::LedgerConfig;
use crate::core::time::Timestamp;
use crate::ledger::{CatchUpReport, Ledger, LedgerError};
use crate::rng::RngManager;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Largest price a single trade may carry. Keeps every running balance far
/// from the `i64` limits.
pub const MAX_TRADE_PRICE: i64 = 1_000_000_000_000;

#[derive(Debug, Error, PartialEq)]
pub enum MarketError {
    #[error("Vendor not found: {0}")]
    VendorNotFound(String),

    #[error("Vendor already exists: {0}")]
    DuplicateVendor(String),

    #[error("Vendor {vendor_id} cannot afford {required}: only {available} on hand")]
    InsufficientCash {
        vendor_id: String,
        required: i64,
        available: i64,
    },

    #[error("Trade price out of range: {0}")]
    InvalidAmount(i64),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Outcome of a recorded trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradeReceipt {
    /// Vendor cash right after the trade (and any ceiling correction)
    pub cash_on_hand: i64,

    /// Corrective amount applied to pin cash to the ceiling
    pub correction: Option<i64>,
}

/// All vendor ledgers of one world
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use vendor_cashflow_core_rs::{LedgerConfig, Market};
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// let mut market = Market::new(LedgerConfig::default(), 2024).unwrap();
/// market.open_vendor("weaponsmith").unwrap();
///
/// let before = market.cash_on_hand("weaponsmith", now).unwrap();
/// let receipt = market.record_sale("weaponsmith", "player_a", 120, now).unwrap();
/// assert_eq!(receipt.cash_on_hand, before + 120);
/// ```
#[derive(Debug, Clone)]
pub struct Market {
    config: LedgerConfig,
    vendors: BTreeMap<String, Ledger>,

    /// Source of vendor seeds and generated vendor ids
    rng: RngManager,
}

impl Market {
    pub fn new(config: LedgerConfig, seed: u64) -> Result<Self, MarketError> {
        config.validate()?;
        Ok(Self {
            config,
            vendors: BTreeMap::new(),
            rng: RngManager::new(seed),
        })
    }

    pub(crate) fn from_parts(config: LedgerConfig, vendors: BTreeMap<String, Ledger>, rng: RngManager) -> Self {
        Self { config, vendors, rng }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn rng_state(&self) -> u64 {
        self.rng.get_state()
    }

    pub fn num_vendors(&self) -> usize {
        self.vendors.len()
    }

    pub fn vendor_ids(&self) -> impl Iterator<Item = &str> {
        self.vendors.keys().map(String::as_str)
    }

    pub fn vendor(&self, vendor_id: &str) -> Option<&Ledger> {
        self.vendors.get(vendor_id)
    }

    pub fn vendor_mut(&mut self, vendor_id: &str) -> Option<&mut Ledger> {
        self.vendors.get_mut(vendor_id)
    }

    pub(crate) fn vendors(&self) -> &BTreeMap<String, Ledger> {
        &self.vendors
    }

    /// Create the ledger for a new vendor
    pub fn open_vendor(&mut self, vendor_id: &str) -> Result<&mut Ledger, MarketError> {
        if self.vendors.contains_key(vendor_id) {
            return Err(MarketError::DuplicateVendor(vendor_id.to_string()));
        }
        let ledger = Ledger::new(vendor_id, self.config, self.rng.next_seed());
        debug!(vendor = vendor_id, "vendor opened");
        Ok(self.vendors.entry(vendor_id.to_string()).or_insert(ledger))
    }

    /// Create a vendor with a generated id and return the id.
    ///
    /// Ids are UUIDs built from the market's seed stream, so the same market
    /// seed spawns the same vendors.
    pub fn spawn_vendor(&mut self) -> Result<String, MarketError> {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.rng.next().to_le_bytes());
        bytes[8..].copy_from_slice(&self.rng.next().to_le_bytes());
        let vendor_id = uuid::Builder::from_random_bytes(bytes).into_uuid().to_string();
        self.open_vendor(&vendor_id)?;
        Ok(vendor_id)
    }

    fn ledger_mut(&mut self, vendor_id: &str) -> Result<&mut Ledger, MarketError> {
        self.vendors
            .get_mut(vendor_id)
            .ok_or_else(|| MarketError::VendorNotFound(vendor_id.to_string()))
    }

    pub fn cash_on_hand(&mut self, vendor_id: &str, t: Timestamp) -> Result<i64, MarketError> {
        Ok(self.ledger_mut(vendor_id)?.get_cash_on_hand(t))
    }

    /// A customer buys goods from the vendor for `price`.
    pub fn record_sale(
        &mut self,
        vendor_id: &str,
        customer: &str,
        price: i64,
        t: Timestamp,
    ) -> Result<TradeReceipt, MarketError> {
        check_price(price)?;
        let ledger = self.ledger_mut(vendor_id)?;
        let correction = ledger.add_transaction(t, price, customer);
        Ok(TradeReceipt {
            cash_on_hand: ledger.balance_at(t),
            correction,
        })
    }

    /// The vendor buys goods from `seller` for `price`, if it has the cash.
    pub fn record_purchase(
        &mut self,
        vendor_id: &str,
        seller: &str,
        price: i64,
        t: Timestamp,
    ) -> Result<TradeReceipt, MarketError> {
        check_price(price)?;
        let ledger = self.ledger_mut(vendor_id)?;
        let available = ledger.get_cash_on_hand(t);
        if price > available {
            return Err(MarketError::InsufficientCash {
                vendor_id: vendor_id.to_string(),
                required: price,
                available,
            });
        }
        let correction = ledger.add_transaction(t, -price, seller);
        Ok(TradeReceipt {
            cash_on_hand: ledger.balance_at(t),
            correction,
        })
    }

    /// Bring every vendor current as of `t`, e.g. after server downtime.
    pub fn catch_up_all(&mut self, t: Timestamp) -> BTreeMap<String, CatchUpReport> {
        self.vendors
            .iter_mut()
            .map(|(id, ledger)| (id.clone(), ledger.catch_up(t)))
            .collect()
    }
}

fn check_price(price: i64) -> Result<(), MarketError> {
    if price <= 0 || price > MAX_TRADE_PRICE {
        return Err(MarketError::InvalidAmount(price));
    }
    Ok(())
}
