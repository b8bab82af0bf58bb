//! # Asset Keeper
//!
//! Per-account restrictions on fungible tokens, each kept in its own
//! [`BalanceStore`]:
//!
//! - **Frozen balances**: the part of an account's balance the issuer has
//!   locked. Freezing adds to it, unfreezing subtracts from it.
//! - **Whitelisted balances**: the most an account is allowed to hold of a
//!   token that requires whitelisting. Set outright, never accumulated.
//!
//! Both live in the shared state tree under their own prefixes
//! ([`FROZEN_BALANCES_PREFIX`], [`WHITELISTED_BALANCES_PREFIX`]), so neither
//! can observe the other or the main balances.

use thiserror::Error;
use tracing::info;

use crate::address::AccountAddress;
use crate::coin::{Amount, Coin};
use crate::error::ErrorKind;
use crate::storage::balance_store::{
    AccountBalance, BalanceGroups, BalanceStore, BalanceStoreError,
};
use crate::storage::keys::{FROZEN_BALANCES_PREFIX, WHITELISTED_BALANCES_PREFIX};
use crate::storage::kv::KvStore;
use crate::storage::pagination::{PageRequest, PageResponse};

#[derive(Debug, Error)]
pub enum KeeperError {
    #[error(transparent)]
    Store(#[from] BalanceStoreError),

    #[error("not enough frozen balance for {address}: frozen {frozen}{denom}, requested {requested}{denom}")]
    InsufficientFrozen {
        address: AccountAddress,
        denom: String,
        frozen: Amount,
        requested: Amount,
    },
}

impl KeeperError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => e.kind(),
            Self::InsufficientFrozen { .. } => ErrorKind::InvalidRequest,
        }
    }
}

pub type KeeperResult<T> = Result<T, KeeperError>;

/// Frozen and whitelisted balances over one backing store.
#[derive(Debug, Clone)]
pub struct AssetKeeper<S> {
    frozen: BalanceStore<S>,
    whitelisted: BalanceStore<S>,
}

impl<S: KvStore + Clone> AssetKeeper<S> {
    pub fn new(store: S) -> Self {
        Self {
            frozen: BalanceStore::new(store.clone(), FROZEN_BALANCES_PREFIX),
            whitelisted: BalanceStore::new(store, WHITELISTED_BALANCES_PREFIX),
        }
    }
}

impl<S: KvStore> AssetKeeper<S> {
    // -- Frozen -------------------------------------------------------------

    /// Lock `coin` on top of whatever is already frozen. Returns the new
    /// frozen amount.
    pub fn freeze(&self, address: &AccountAddress, coin: &Coin) -> KeeperResult<Amount> {
        let frozen = self.frozen.credit(address, coin)?;
        info!(%address, %coin, total = %frozen, "balance frozen");
        Ok(frozen)
    }

    /// Release `coin` from the frozen balance. Returns what stays frozen.
    pub fn unfreeze(&self, address: &AccountAddress, coin: &Coin) -> KeeperResult<Amount> {
        let frozen = self.frozen.balance(address, &coin.denom)?;
        let remaining = frozen
            .checked_sub(&coin.amount)
            .ok_or_else(|| KeeperError::InsufficientFrozen {
                address: address.clone(),
                denom: coin.denom.clone(),
                frozen: frozen.clone(),
                requested: coin.amount.clone(),
            })?;

        let updated = Coin {
            denom: coin.denom.clone(),
            amount: remaining.clone(),
        };
        self.frozen.set_balance(address, &updated)?;
        info!(%address, %coin, total = %remaining, "balance unfrozen");
        Ok(remaining)
    }

    pub fn frozen_balance(&self, address: &AccountAddress, denom: &str) -> KeeperResult<Amount> {
        Ok(self.frozen.balance(address, denom)?)
    }

    pub fn frozen_balances(
        &self,
        address: &AccountAddress,
        request: &PageRequest,
    ) -> KeeperResult<(Vec<Coin>, PageResponse)> {
        Ok(self.frozen.paginated_balances(address, request)?)
    }

    pub fn all_frozen_balances(
        &self,
        request: &PageRequest,
    ) -> KeeperResult<(Vec<AccountBalance>, PageResponse)> {
        Ok(self.frozen.collect_balances_grouped(request)?)
    }

    // -- Whitelisted --------------------------------------------------------

    /// Replace the whitelisted limit for `coin.denom`. Zero removes it.
    pub fn set_whitelisted_balance(&self, address: &AccountAddress, coin: &Coin) -> KeeperResult<()> {
        self.whitelisted.set_balance(address, coin)?;
        info!(%address, %coin, "whitelisted balance set");
        Ok(())
    }

    pub fn whitelisted_balance(&self, address: &AccountAddress, denom: &str) -> KeeperResult<Amount> {
        Ok(self.whitelisted.balance(address, denom)?)
    }

    pub fn whitelisted_balances(
        &self,
        address: &AccountAddress,
        request: &PageRequest,
    ) -> KeeperResult<(Vec<Coin>, PageResponse)> {
        Ok(self.whitelisted.paginated_balances(address, request)?)
    }

    pub fn all_whitelisted_balances(
        &self,
        request: &PageRequest,
    ) -> KeeperResult<(Vec<AccountBalance>, PageResponse)> {
        Ok(self.whitelisted.collect_balances_grouped(request)?)
    }

    // -- Genesis ------------------------------------------------------------

    /// Every frozen balance, grouped per account.
    pub fn export_frozen(&self) -> KeeperResult<Vec<AccountBalance>> {
        export(&self.frozen)
    }

    /// Every whitelisted balance, grouped per account.
    pub fn export_whitelisted(&self) -> KeeperResult<Vec<AccountBalance>> {
        export(&self.whitelisted)
    }

    /// Write exported frozen balances back. Existing records for the same
    /// `(account, denom)` are overwritten.
    pub fn import_frozen(&self, balances: &[AccountBalance]) -> KeeperResult<()> {
        import(&self.frozen, balances)
    }

    pub fn import_whitelisted(&self, balances: &[AccountBalance]) -> KeeperResult<()> {
        import(&self.whitelisted, balances)
    }
}

fn export<S: KvStore>(store: &BalanceStore<S>) -> KeeperResult<Vec<AccountBalance>> {
    let mut groups = BalanceGroups::new();
    for entry in store.iter_all() {
        let (address, coin) = entry?;
        groups.push(address, coin);
    }
    Ok(groups.into_vec())
}

fn import<S: KvStore>(store: &BalanceStore<S>, balances: &[AccountBalance]) -> KeeperResult<()> {
    for balance in balances {
        for coin in balance.coins.iter() {
            store.set_balance(&balance.address, coin)?;
        }
    }
    Ok(())
}
