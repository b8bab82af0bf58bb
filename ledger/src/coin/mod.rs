//! # Coin Model
//!
//! The arithmetic vocabulary of the ledger:
//!
//! - [`Amount`]: arbitrary-precision, non-negative integer.
//! - [`Coin`]: an amount bound to a validated denomination.
//! - [`Coins`]: a sorted, denom-unique set of non-zero coins; one
//!   account's multi-token balance.
//!
//! A coin with a zero amount is semantically "absent". It may exist as a
//! value (it is how callers ask the balance store to delete a record) but
//! it is never persisted and never appears inside a [`Coins`] set.

pub mod amount;
pub mod coins;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{MAX_DENOM_LEN, MIN_DENOM_LEN};
use crate::error::ErrorKind;

pub use amount::Amount;
pub use coins::Coins;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors produced by coin construction and arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoinError {
    #[error("invalid denom: {0:?}")]
    InvalidDenom(String),

    #[error("invalid amount: {0:?}")]
    InvalidAmount(String),

    #[error("invalid coin: {0:?}")]
    InvalidCoin(String),

    #[error("duplicate denom: {0}")]
    DuplicateDenom(String),

    #[error("insufficient funds: available {available}{denom}, requested {requested}{denom}")]
    InsufficientFunds {
        denom: String,
        available: Amount,
        requested: Amount,
    },
}

impl CoinError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidRequest
    }
}

// ---------------------------------------------------------------------------
// Denom validation
// ---------------------------------------------------------------------------

/// Validate a token identifier.
///
/// A denom starts with an ASCII letter, followed by letters, digits or one
/// of `/ : . _ -`, for a total length of 3 to 128 bytes.
pub fn validate_denom(denom: &str) -> Result<(), CoinError> {
    let bytes = denom.as_bytes();
    let len_ok = (MIN_DENOM_LEN..=MAX_DENOM_LEN).contains(&bytes.len());
    let first_ok = bytes.first().is_some_and(|b| b.is_ascii_alphabetic());
    let rest_ok = bytes
        .iter()
        .skip(1)
        .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'/' | b':' | b'.' | b'_' | b'-'));

    if len_ok && first_ok && rest_ok {
        Ok(())
    } else {
        Err(CoinError::InvalidDenom(denom.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// An amount of a single denomination.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    /// Build a coin, validating the denom.
    pub fn new(denom: impl Into<String>, amount: impl Into<Amount>) -> Result<Self, CoinError> {
        let denom = denom.into();
        validate_denom(&denom)?;
        Ok(Self {
            denom,
            amount: amount.into(),
        })
    }

    /// A zero coin of `denom`.
    pub fn zero(denom: impl Into<String>) -> Result<Self, CoinError> {
        Self::new(denom, Amount::zero())
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Re-check the denom of a coin that did not come through [`Coin::new`]
    /// (e.g. one produced by a decoder).
    pub fn validate(&self) -> Result<(), CoinError> {
        validate_denom(&self.denom)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = CoinError;

    /// Parses the `<amount><denom>` form, e.g. `1500ufrm`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| CoinError::InvalidCoin(s.to_string()))?;
        if split == 0 {
            return Err(CoinError::InvalidCoin(s.to_string()));
        }
        let (amount, denom) = s.split_at(split);
        Coin::new(denom, amount.parse::<Amount>()?)
    }
}
