//! Vendor cash tunables
//!
//! All cash is measured in gold pieces (i64). Bands are half-open:
//! `[low, high)`.

use crate::ledger::LedgerError;
use serde::{Deserialize, Serialize};

/// Parameters shared by every vendor ledger in a market
///
/// # Example
/// ```
/// use vendor_cashflow_core_rs::LedgerConfig;
///
/// let config = LedgerConfig::default();
/// assert!(config.validate().is_ok());
/// assert!(config.in_target_band(8_000));
/// assert!(!config.in_target_band(24_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Lower bound of the cash-on-hand band vendors drift toward
    pub target_cash_low: i64,

    /// Upper bound (exclusive) of the target band
    pub target_cash_high: i64,

    /// Largest amount a simulated day may add
    pub max_daily_inflow: i64,

    /// Largest amount a simulated day may remove
    pub max_daily_outflow: i64,

    /// A simulated day lasts 24h ± this many hours
    pub day_length_spread_hours: i64,

    /// Lower bound of the re-rolled spending ceiling
    pub max_cash_low: i64,

    /// Upper bound (exclusive) of the re-rolled spending ceiling
    pub max_cash_high: i64,

    pub min_days_before_max_cash_reset: i64,
    pub max_days_before_max_cash_reset: i64,

    /// Consecutive idle in-band days before a vendor's history collapses
    pub dormancy_threshold_days: u32,

    /// Synthetic entries per simulated day
    pub transactions_per_day: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            target_cash_low: 8_000,
            target_cash_high: 24_000,
            max_daily_inflow: 4_800,
            max_daily_outflow: 2_400,
            day_length_spread_hours: 2,
            max_cash_low: 40_000,
            max_cash_high: 60_000,
            min_days_before_max_cash_reset: 7,
            max_days_before_max_cash_reset: 14,
            dormancy_threshold_days: 3,
            transactions_per_day: 7,
        }
    }
}

impl LedgerConfig {
    /// Parse a JSON document (missing fields take defaults) and validate it
    pub fn from_json_str(json: &str) -> Result<Self, LedgerError> {
        let config: LedgerConfig = serde_json::from_str(json)
            .map_err(|e| LedgerError::InvalidConfig(format!("Config parse failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every range the engine later draws from
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.target_cash_low >= self.target_cash_high {
            return Err(LedgerError::InvalidConfig(format!(
                "target cash band is empty: [{}, {})",
                self.target_cash_low, self.target_cash_high
            )));
        }
        if self.max_daily_inflow <= 0 || self.max_daily_outflow <= 0 {
            return Err(LedgerError::InvalidConfig(format!(
                "daily cash flow caps must be positive (inflow {}, outflow {})",
                self.max_daily_inflow, self.max_daily_outflow
            )));
        }
        if self.day_length_spread_hours < 0 || self.day_length_spread_hours >= 24 {
            return Err(LedgerError::InvalidConfig(format!(
                "day length spread must be in [0, 24) hours, got {}",
                self.day_length_spread_hours
            )));
        }
        if self.max_cash_low >= self.max_cash_high {
            return Err(LedgerError::InvalidConfig(format!(
                "max cash band is empty: [{}, {})",
                self.max_cash_low, self.max_cash_high
            )));
        }
        if self.max_days_before_max_cash_reset <= 0
            || self.min_days_before_max_cash_reset < 0
            || self.min_days_before_max_cash_reset > self.max_days_before_max_cash_reset
        {
            return Err(LedgerError::InvalidConfig(format!(
                "max cash reset interval invalid: min {} days, max {} days",
                self.min_days_before_max_cash_reset, self.max_days_before_max_cash_reset
            )));
        }
        if self.dormancy_threshold_days == 0 {
            return Err(LedgerError::InvalidConfig(
                "dormancy threshold must be at least one day".to_string(),
            ));
        }
        if self.transactions_per_day == 0 {
            return Err(LedgerError::InvalidConfig(
                "transactions_per_day must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn in_target_band(&self, cash: i64) -> bool {
        self.target_cash_low <= cash && cash < self.target_cash_high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(LedgerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_target_band() {
        let config = LedgerConfig {
            target_cash_low: 10,
            target_cash_high: 10,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LedgerError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_inverted_reset_interval() {
        let config = LedgerConfig {
            min_days_before_max_cash_reset: 20,
            max_days_before_max_cash_reset: 14,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = LedgerConfig::from_json_str(r#"{"max_daily_inflow": 100}"#).unwrap();
        assert_eq!(config.max_daily_inflow, 100);
        assert_eq!(config.target_cash_low, 8_000);
    }

    #[test]
    fn test_json_with_invalid_values_rejected() {
        let err = LedgerConfig::from_json_str(r#"{"transactions_per_day": 0}"#).unwrap_err();
        assert!(err.to_string().contains("transactions_per_day"));
    }
}
