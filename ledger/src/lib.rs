// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ferrum Ledger: Core Library
//!
//! The two consensus-critical pieces of a Ferrum node that every validator
//! must compute bit-for-bit identically:
//!
//! 1. **Balances.** A per-account, per-denomination ledger on an ordered
//!    key-value store, with prefix isolation between subsystems, lazy full
//!    scans and paginated queries.
//! 2. **Deterministic gas.** A fixed price list per operation kind and a
//!    funding calculator that turns planned operations into the exact
//!    fee-denom amount an account needs.
//!
//! ## Architecture
//!
//! - **coin**: `Amount`, `Coin`, `Coins`. Arbitrary precision, never negative.
//! - **address**: Account addresses and their bech32 form.
//! - **storage**: KV substrate, key layout, codec, pagination, balance store
//!   and the sled-backed `LedgerDb`.
//! - **gas**: Operation kinds, the gas table, the funding calculator.
//! - **keeper**: Frozen and whitelisted balances for issued tokens.
//! - **config**: Protocol constants and the operator config file.
//! - **error**: The `ErrorKind` every module error maps onto.
//!
//! ## Design Philosophy
//!
//! 1. Determinism first: integer gas, ceiling-rounded decimal fees, ordered
//!    scans. No floats anywhere near consensus.
//! 2. Nothing global. The gas table and stores are injected.
//! 3. A zero balance is not stored. Ever.
//! 4. If it touches money, it has tests. Plural.

pub mod address;
pub mod coin;
pub mod config;
pub mod error;
pub mod gas;
pub mod keeper;
pub mod storage;

pub use address::AccountAddress;
pub use coin::{Amount, Coin, Coins};
pub use error::ErrorKind;
