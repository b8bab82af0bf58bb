//! # Account Addresses
//!
//! An account address is an opaque byte string (typically a 20- or 32-byte
//! key hash) with a Bech32 text form:
//!
//! ```text
//! raw bytes (1..=48)
//!     -> Bech32("ferrum", bytes) -> ferrum1qy352euf...
//! ```
//!
//! Raw bytes are what end up inside storage keys; the Bech32 string is what
//! users and query handlers see. Both directions are validated: an empty or
//! oversized byte string, a bad checksum or a foreign HRP are typed errors,
//! never a garbage address.

use std::fmt;
use std::str::FromStr;

use bech32::primitives::decode::CheckedHrpstring;
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{ACCOUNT_HRP, MAX_ADDRESS_LEN};
use crate::error::ErrorKind;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while building or parsing an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address too long: {len} bytes (max {max})", max = MAX_ADDRESS_LEN)]
    TooLong { len: usize },

    #[error("bech32 decode error: {0}")]
    Bech32Decode(String),

    #[error("invalid HRP: expected '{expected}', got '{got}'")]
    InvalidHrp { expected: String, got: String },
}

impl AddressError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidRequest
    }
}

// ---------------------------------------------------------------------------
// AccountAddress
// ---------------------------------------------------------------------------

/// Raw account address bytes.
///
/// Ordering is byte-wise, which matches the order accounts appear in under a
/// balance store scan for addresses of equal length.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountAddress(Vec<u8>);

impl AccountAddress {
    /// Wrap raw address bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, AddressError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(AddressError::Empty);
        }
        if bytes.len() > MAX_ADDRESS_LEN {
            return Err(AddressError::TooLong { len: bytes.len() });
        }
        Ok(Self(bytes))
    }

    /// Parse a Bech32 address, checking checksum and HRP. Only the Bech32
    /// checksum is accepted, so every address has exactly one text form.
    pub fn from_bech32(addr: &str) -> Result<Self, AddressError> {
        let checked = CheckedHrpstring::new::<Bech32>(addr)
            .map_err(|e| AddressError::Bech32Decode(e.to_string()))?;

        let hrp = checked.hrp();
        if hrp != Hrp::parse_unchecked(ACCOUNT_HRP) {
            return Err(AddressError::InvalidHrp {
                expected: ACCOUNT_HRP.to_string(),
                got: hrp.to_string(),
            });
        }

        Self::from_bytes(checked.byte_iter().collect::<Vec<u8>>())
    }

    /// Bech32 form with the account HRP.
    pub fn to_bech32(&self) -> String {
        self.to_string()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hrp = Hrp::parse_unchecked(ACCOUNT_HRP);
        bech32::encode_to_fmt::<Bech32, _>(f, hrp, &self.0).map_err(|_| fmt::Error)
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress({self})")
    }
}

impl FromStr for AccountAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bech32(s)
    }
}

impl Serialize for AccountAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_bech32(&raw).map_err(serde::de::Error::custom)
    }
}
