//! # LedgerDb: Persistent Storage Engine
//!
//! The on-disk home of every ledger subsystem, built on sled's embedded
//! key-value store.
//!
//! ## Tree Layout
//!
//! All consensus state lives in a single `state` tree, partitioned by a
//! one-byte subsystem prefix (see [`super::keys`]):
//!
//! | Prefix | Subsystem              | Handle                       |
//! |--------|------------------------|------------------------------|
//! | `0x01` | account balances       | [`LedgerDb::balances`]       |
//! | `0x02` | frozen balances        | [`LedgerDb::asset_keeper`]   |
//! | `0x03` | whitelisted balances   | [`LedgerDb::asset_keeper`]   |
//!
//! Keeping everything in one tree means one ordered keyspace; the prefixes
//! are what keeps subsystems from ever seeing each other's records.

use sled::{Db, Tree};
use std::path::Path;

use super::balance_store::BalanceStore;
use super::keys::BALANCES_PREFIX;
use super::kv::StoreResult;
use crate::keeper::AssetKeeper;

/// Name of the tree holding all prefixed ledger state.
const STATE_TREE: &str = "state";

// ---------------------------------------------------------------------------
// LedgerDb
// ---------------------------------------------------------------------------

/// Persistent storage engine for the ledger.
///
/// `sled::Tree` handles are cheap reference-counted clones, so every store
/// handed out here owns its own handle and may outlive the borrow of `self`.
///
/// # Thread Safety
///
/// sled supports lock-free concurrent reads and serialized writes.
/// `LedgerDb` can be shared across threads via `Arc<LedgerDb>` or simply
/// cloned.
#[derive(Debug, Clone)]
pub struct LedgerDb {
    db: Db,
    state: Tree,
}

impl LedgerDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a temporary database that is removed when dropped.
    pub fn open_temporary() -> StoreResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let state = db.open_tree(STATE_TREE)?;
        Ok(Self { db, state })
    }

    /// Account balances.
    pub fn balances(&self) -> BalanceStore<Tree> {
        BalanceStore::new(self.state.clone(), BALANCES_PREFIX)
    }

    /// Frozen and whitelisted balances.
    pub fn asset_keeper(&self) -> AssetKeeper<Tree> {
        AssetKeeper::new(self.state.clone())
    }

    /// The raw prefixed state tree.
    pub fn state_tree(&self) -> &Tree {
        &self.state
    }

    /// Block until all pending writes are durable.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
