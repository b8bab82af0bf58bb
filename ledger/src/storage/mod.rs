//! # Storage Module
//!
//! Persistent balance state for the ledger.
//!
//! ## Architecture
//!
//! ```text
//! kv.rs           : KvStore trait, sled and in-memory backends, PrefixStore
//! keys.rs         : subsystem prefixes and the (address, denom) key layout
//! codec.rs        : reversible binary codec for coin records
//! pagination.rs   : page request/response walk over a key range
//! balance_store.rs: (account, denom) -> amount, zero-never-stored
//! db.rs           : sled database handing out prefixed stores
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! BalanceStore ─► PrefixStore ─► KvStore (sled::Tree | MemStore)
//!      │
//!      └─► CoinCodec (bincode)
//! ```
//!
//! ## Design Decisions
//!
//! 1. **One tree, many prefixes.** Every subsystem gets a one-byte prefix
//!    in a shared sled tree; `PrefixStore` guarantees no subsystem can read
//!    or write outside its range.
//!
//! 2. **Bincode for on-disk serialization.** Compact, fast, deterministic.
//!    JSON is for config and the CLI; bincode is for storage.
//!
//! 3. **Lazy scans.** Full-store iteration is an iterator, not a callback
//!    or a collected `Vec`; exports of large states stream.

pub mod balance_store;
pub mod codec;
pub mod db;
pub mod keys;
pub mod kv;
pub mod pagination;

pub use balance_store::{AccountBalance, BalanceGroups, BalanceStore, BalanceStoreError};
pub use codec::{BincodeCoinCodec, CoinCodec};
pub use db::LedgerDb;
pub use kv::{KvStore, MemStore, PrefixStore, StoreError};
pub use pagination::{PageRequest, PageResponse};
