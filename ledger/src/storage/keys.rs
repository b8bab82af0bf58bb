//! # Storage Key Layout
//!
//! All ledger subsystems share one sled tree, partitioned by a one-byte
//! subsystem prefix. Inside a balance partition, a record key is:
//!
//! ```text
//! | len (1B) | address bytes (len B) | denom bytes (UTF-8) |
//! ```
//!
//! The address is length-prefixed because address lengths vary (20-byte
//! account hashes, 32-byte module accounts). A bare `address ++ denom`
//! concatenation would let `(0xAB, "cdef")` and `(0xAB63, "def")` collide
//! whenever the denom's first byte could also be an address byte.
//!
//! Because the length byte sorts first, a full scan visits accounts grouped
//! by address length, then by address bytes, then by denom.

use thiserror::Error;

use crate::address::{AccountAddress, AddressError};
use crate::coin::{validate_denom, CoinError};

/// Account balances.
pub const BALANCES_PREFIX: &[u8] = &[0x01];

/// Frozen balances managed by the asset keeper.
pub const FROZEN_BALANCES_PREFIX: &[u8] = &[0x02];

/// Whitelisted balances managed by the asset keeper.
pub const WHITELISTED_BALANCES_PREFIX: &[u8] = &[0x03];

/// Why a raw key could not be split back into `(address, denom)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("key is empty")]
    Empty,

    #[error("key truncated: address length {expected}, only {available} bytes follow")]
    Truncated { expected: usize, available: usize },

    #[error("invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("denom is not valid UTF-8")]
    DenomNotUtf8,

    #[error("invalid denom: {0}")]
    Denom(#[from] CoinError),
}

/// Key prefix under which all of `address`'s records live.
pub fn address_prefix(address: &AccountAddress) -> Vec<u8> {
    let bytes = address.as_bytes();
    let mut key = Vec::with_capacity(1 + bytes.len());
    // AccountAddress caps the length at MAX_ADDRESS_LEN, well below 256.
    key.push(bytes.len() as u8);
    key.extend_from_slice(bytes);
    key
}

/// Full record key for `(address, denom)`.
pub fn balance_key(address: &AccountAddress, denom: &str) -> Vec<u8> {
    let mut key = address_prefix(address);
    key.extend_from_slice(denom.as_bytes());
    key
}

/// Parse the address at the front of a record key and return it together
/// with the remaining (denom) bytes.
pub fn address_from_balance_key(key: &[u8]) -> Result<(AccountAddress, &[u8]), KeyError> {
    let (&len, rest) = key.split_first().ok_or(KeyError::Empty)?;
    let len = len as usize;
    if rest.len() < len {
        return Err(KeyError::Truncated {
            expected: len,
            available: rest.len(),
        });
    }
    let (address, denom) = rest.split_at(len);
    Ok((AccountAddress::from_bytes(address)?, denom))
}

/// Split a record key into a validated address and denom.
pub fn split_balance_key(key: &[u8]) -> Result<(AccountAddress, String), KeyError> {
    let (address, denom) = address_from_balance_key(key)?;
    let denom = std::str::from_utf8(denom).map_err(|_| KeyError::DenomNotUtf8)?;
    validate_denom(denom)?;
    Ok((address, denom.to_string()))
}
