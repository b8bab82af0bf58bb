//! # Deterministic Gas
//!
//! Table-driven gas accounting and the funding calculator built on it.
//!
//! ```text
//! operation.rs: closed set of operation kinds and their string tags
//! table.rs    : kind -> gas, fixed per-transaction gas, batch totals
//! funding.rs  : gas × price -> exact fee-denom funding, Funder seam
//! ```

pub mod funding;
pub mod operation;
pub mod table;

use thiserror::Error;

use crate::error::ErrorKind;

pub use funding::{FundingCalculator, FundingError, FundingRequest, Funder};
pub use operation::OperationKind;
pub use table::{FixedGasPolicy, GasTable};

/// Errors from gas and fee computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GasError {
    /// The kind exists but has no deterministic price.
    #[error("unsupported operation type for deterministic gas: {0}")]
    UnsupportedOperation(OperationKind),

    /// The tag does not name any operation kind.
    #[error("unknown operation type: {0:?}")]
    UnknownOperation(String),

    #[error("invalid gas price {0}: must be non-negative")]
    InvalidGasPrice(String),

    #[error("gas computation overflowed")]
    Overflow,
}

impl GasError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedOperation(_) | Self::UnknownOperation(_) => {
                ErrorKind::UnsupportedOperation
            }
            Self::InvalidGasPrice(_) => ErrorKind::InvalidRequest,
            Self::Overflow => ErrorKind::Internal,
        }
    }
}
