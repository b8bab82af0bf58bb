//! # Ledger Configuration & Constants
//!
//! Every consensus-relevant constant of the ledger lives here. Changing any
//! of them on a live network changes state transitions, so treat edits as
//! hard forks.
//!
//! [`LedgerConfig`] is the small operator-facing configuration file. It is
//! loaded once at process start, validated, and turned into immutable values
//! (a [`GasTable`] and a [`FundingCalculator`]) that are injected into the
//! components that need them.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coin::validate_denom;
use crate::error::ErrorKind;
use crate::gas::{FundingCalculator, GasTable};

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Bech32 human-readable prefix for account addresses.
pub const ACCOUNT_HRP: &str = "ferrum";

/// Maximum raw address length: the longest byte string whose Bech32 form
/// with [`ACCOUNT_HRP`] fits the 90-character Bech32 code length. Balance
/// keys store the length in one byte, which this also satisfies.
pub const MAX_ADDRESS_LEN: usize = 48;

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Minimum denom length, inclusive.
pub const MIN_DENOM_LEN: usize = 3;

/// Maximum denom length, inclusive.
pub const MAX_DENOM_LEN: usize = 128;

/// Native fee denomination (1 frm = 10^6 ufrm).
pub const DEFAULT_FEE_DENOM: &str = "ufrm";

// ---------------------------------------------------------------------------
// Gas
// ---------------------------------------------------------------------------

/// Gas charged once per transaction on top of the per-operation cost.
/// Covers signature verification and the ante handler.
pub const DEFAULT_FIXED_GAS: u64 = 65_000;

/// Default gas price in fee denom units, as a decimal string.
pub const DEFAULT_GAS_PRICE: &str = "0.0625";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Page size used when a page request leaves `limit` at zero.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

// ---------------------------------------------------------------------------
// LedgerConfig
// ---------------------------------------------------------------------------

/// Errors raised while loading or validating a [`LedgerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid fee denom: {0}")]
    InvalidFeeDenom(String),

    #[error("invalid gas price {0:?}: must be a non-negative decimal")]
    InvalidGasPrice(String),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidRequest
    }
}

/// Operator configuration, read from a JSON file.
///
/// ```json
/// {
///   "fee_denom": "ufrm",
///   "gas_price": "0.0625",
///   "gas_table": { "fixed_gas": 65000, "operations": { "bank.send": 50000 } }
/// }
/// ```
///
/// Every field is optional; missing fields fall back to the constants above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Denomination fees and funding amounts are paid in.
    pub fee_denom: String,
    /// Default gas price, kept as a string so that it round-trips exactly.
    pub gas_price: String,
    /// Replaces the built-in gas table entirely when present.
    pub gas_table: Option<GasTable>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            fee_denom: DEFAULT_FEE_DENOM.to_string(),
            gas_price: DEFAULT_GAS_PRICE.to_string(),
            gas_table: None,
        }
    }
}

impl LedgerConfig {
    /// Read and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config: LedgerConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_denom(&self.fee_denom)
            .map_err(|_| ConfigError::InvalidFeeDenom(self.fee_denom.clone()))?;
        self.parsed_gas_price()?;
        Ok(())
    }

    /// The configured gas price as a decimal.
    pub fn parsed_gas_price(&self) -> Result<Decimal, ConfigError> {
        match Decimal::from_str(self.gas_price.trim()) {
            Ok(price) if !price.is_sign_negative() => Ok(price),
            _ => Err(ConfigError::InvalidGasPrice(self.gas_price.clone())),
        }
    }

    /// The gas table to use: the override if configured, the built-in
    /// default otherwise.
    pub fn gas_table(&self) -> GasTable {
        self.gas_table.clone().unwrap_or_default()
    }

    /// Build the funding calculator described by this config.
    pub fn funding_calculator(&self) -> Result<FundingCalculator, ConfigError> {
        let gas_price = self.parsed_gas_price()?;
        validate_denom(&self.fee_denom)
            .map_err(|_| ConfigError::InvalidFeeDenom(self.fee_denom.clone()))?;
        Ok(FundingCalculator::new(
            Arc::new(self.gas_table()),
            gas_price,
            self.fee_denom.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = LedgerConfig::default();
        config.validate().expect("defaults must validate");
        assert_eq!(config.parsed_gas_price().unwrap(), Decimal::new(625, 4));
    }

    #[test]
    fn default_constants_sanity() {
        assert!(MIN_DENOM_LEN <= DEFAULT_FEE_DENOM.len());
        assert!(DEFAULT_FEE_DENOM.len() <= MAX_DENOM_LEN);
        assert!(MAX_ADDRESS_LEN <= u8::MAX as usize);
        assert!(DEFAULT_PAGE_LIMIT > 0);
    }

    #[test]
    fn negative_gas_price_rejected() {
        let config = LedgerConfig {
            gas_price: "-0.5".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidGasPrice(_))
        ));
    }

    #[test]
    fn garbage_gas_price_rejected() {
        let config = LedgerConfig {
            gas_price: "NaN".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.parsed_gas_price(),
            Err(ConfigError::InvalidGasPrice(_))
        ));
    }

    #[test]
    fn bad_fee_denom_rejected() {
        let config = LedgerConfig {
            fee_denom: "1x".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFeeDenom(_))
        ));
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"gas_price": "0.5", "gas_table": {{"fixed_gas": 10, "operations": {{"bank.send": 100}}}}}}"#
        )
        .unwrap();

        let config = LedgerConfig::load(file.path()).expect("config should load");
        assert_eq!(config.fee_denom, DEFAULT_FEE_DENOM);
        assert_eq!(config.parsed_gas_price().unwrap(), Decimal::new(5, 1));

        let table = config.gas_table();
        assert_eq!(table.fixed_gas(), 10);
        assert_eq!(
            table.gas_for_operation(crate::gas::OperationKind::BankSend),
            Some(100)
        );
        assert_eq!(
            table.gas_for_operation(crate::gas::OperationKind::StakingDelegate),
            None
        );
    }

    #[test]
    fn load_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            LedgerConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
