//! PyO3 wrapper for Market

use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::LedgerConfig;
use crate::core::time::Timestamp;
use crate::market::{Market as RustMarket, MarketError};
use chrono::DateTime;

/// Python wrapper for Rust Market
///
/// # Example (from Python)
///
/// ```python
/// from vendor_cashflow_core_rs import Market
///
/// market = Market(2024)
/// market.open_vendor("weaponsmith")
/// cash = market.cash_on_hand("weaponsmith", 1_704_067_200)
/// market.record_sale("weaponsmith", "player_a", 120, 1_704_067_200)
/// ```
#[pyclass(name = "Market")]
pub struct PyMarket {
    inner: RustMarket,
}

fn to_timestamp(unix_seconds: i64) -> PyResult<Timestamp> {
    DateTime::from_timestamp(unix_seconds, 0)
        .ok_or_else(|| PyValueError::new_err(format!("Timestamp out of range: {}", unix_seconds)))
}

fn to_py_err(err: MarketError) -> PyErr {
    match err {
        MarketError::VendorNotFound(_) => PyKeyError::new_err(err.to_string()),
        MarketError::DuplicateVendor(_) | MarketError::InvalidAmount(_) | MarketError::InsufficientCash { .. } => {
            PyValueError::new_err(err.to_string())
        }
        MarketError::Ledger(_) => PyRuntimeError::new_err(err.to_string()),
    }
}

fn parse_config(config_json: Option<&str>) -> PyResult<LedgerConfig> {
    match config_json {
        Some(json) => LedgerConfig::from_json_str(json).map_err(|e| PyValueError::new_err(e.to_string())),
        None => Ok(LedgerConfig::default()),
    }
}

#[pymethods]
impl PyMarket {
    /// Create an empty market
    ///
    /// # Errors
    ///
    /// Raises ValueError if `config_json` does not parse or validate.
    #[new]
    #[pyo3(signature = (seed, config_json=None))]
    fn new(seed: u64, config_json: Option<&str>) -> PyResult<Self> {
        let config = parse_config(config_json)?;
        let inner = RustMarket::new(config, seed).map_err(to_py_err)?;
        Ok(PyMarket { inner })
    }

    fn open_vendor(&mut self, vendor_id: &str) -> PyResult<()> {
        self.inner.open_vendor(vendor_id).map(|_| ()).map_err(to_py_err)
    }

    fn spawn_vendor(&mut self) -> PyResult<String> {
        self.inner.spawn_vendor().map_err(to_py_err)
    }

    fn vendor_ids(&self) -> Vec<String> {
        self.inner.vendor_ids().map(str::to_string).collect()
    }

    fn cash_on_hand(&mut self, vendor_id: &str, unix_seconds: i64) -> PyResult<i64> {
        let t = to_timestamp(unix_seconds)?;
        self.inner.cash_on_hand(vendor_id, t).map_err(to_py_err)
    }

    /// Returns the vendor's cash after the sale.
    fn record_sale(&mut self, vendor_id: &str, customer: &str, price: i64, unix_seconds: i64) -> PyResult<i64> {
        let t = to_timestamp(unix_seconds)?;
        self.inner
            .record_sale(vendor_id, customer, price, t)
            .map(|receipt| receipt.cash_on_hand)
            .map_err(to_py_err)
    }

    /// Returns the vendor's cash after the purchase.
    ///
    /// Raises ValueError if the vendor cannot afford it.
    fn record_purchase(&mut self, vendor_id: &str, seller: &str, price: i64, unix_seconds: i64) -> PyResult<i64> {
        let t = to_timestamp(unix_seconds)?;
        self.inner
            .record_purchase(vendor_id, seller, price, t)
            .map(|receipt| receipt.cash_on_hand)
            .map_err(to_py_err)
    }

    /// Text pages of the vendor's ledger, nine lines each
    fn display_pages(&self, vendor_id: &str) -> PyResult<Vec<Vec<String>>> {
        let ledger = self
            .inner
            .vendor(vendor_id)
            .ok_or_else(|| to_py_err(MarketError::VendorNotFound(vendor_id.to_string())))?;
        Ok(ledger.to_display_pages().into_iter().map(|page| page.lines).collect())
    }

    fn to_json(&self) -> PyResult<String> {
        self.inner.to_json().map_err(to_py_err)
    }

    #[staticmethod]
    #[pyo3(signature = (json, config_json=None))]
    fn from_json(json: &str, config_json: Option<&str>) -> PyResult<Self> {
        let config = parse_config(config_json)?;
        let inner = RustMarket::from_json(json, config).map_err(to_py_err)?;
        Ok(PyMarket { inner })
    }
}
