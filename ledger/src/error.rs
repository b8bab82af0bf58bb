//! Error classification shared by every module.
//!
//! Each module keeps its own `thiserror` enum, but all of them map onto a
//! small, stable [`ErrorKind`] so that callers (query handlers, client
//! tooling) can tell operator-facing failures from rejected requests without
//! matching on individual variants.

use std::fmt;

/// Stable, inspectable error class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The store or codec contract was broken somewhere. Operator-facing.
    Internal,
    /// The caller sent something malformed. Client-facing.
    InvalidRequest,
    /// The chain has no deterministic price for the requested operation.
    UnsupportedOperation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Internal => write!(f, "internal"),
            Self::InvalidRequest => write!(f, "invalid request"),
            Self::UnsupportedOperation => write!(f, "unsupported operation"),
        }
    }
}
