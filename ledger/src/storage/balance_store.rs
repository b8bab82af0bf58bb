//! # Balance Store
//!
//! A prefix-isolated map `(account, denom) -> amount` on top of any
//! [`KvStore`]. Records are keyed as described in [`super::keys`] and valued
//! with the codec-encoded [`Coin`].
//!
//! The one invariant everything else leans on: **the store never holds a
//! zero-amount record.** Writing a zero coin deletes the key. Absence and
//! zero are therefore indistinguishable to readers, and scans and pages never
//! contain phantom empty balances.
//!
//! Three read paths, for three kinds of callers:
//!
//! | Call                          | Scope         | Used for                 |
//! |-------------------------------|---------------|--------------------------|
//! | [`BalanceStore::iter_all`]    | whole store   | state export             |
//! | [`BalanceStore::paginated_balances`] | one account | balance queries   |
//! | [`BalanceStore::collect_balances_grouped`] | whole store, paged | multi-account reports |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::address::AccountAddress;
use crate::coin::{Amount, Coin, CoinError, Coins};
use crate::error::ErrorKind;

use super::codec::{BincodeCoinCodec, CoinCodec};
use super::keys::{self, KeyError};
use super::kv::{KvIter, KvStore, PrefixStore, StoreError};
use super::pagination::{paginate, PageRequest, PageResponse, PaginationError};

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during balance store operations.
#[derive(Debug, Error)]
pub enum BalanceStoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A key in the store could not be parsed back into `(address, denom)`.
    #[error("invalid address in the balances store saved with key {key}: {source}")]
    CorruptKey { key: String, source: KeyError },

    /// A value in the store could not be decoded, or disagrees with its key.
    #[error("corrupt balance record at key {key}: {reason}")]
    CorruptRecord { key: String, reason: String },

    /// The caller's request could not be served as asked.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Coin(#[from] CoinError),
}

impl BalanceStoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(_) | Self::CorruptKey { .. } | Self::CorruptRecord { .. } => {
                ErrorKind::Internal
            }
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::Coin(e) => e.kind(),
        }
    }
}

impl From<PaginationError> for BalanceStoreError {
    fn from(err: PaginationError) -> Self {
        match err {
            PaginationError::InvalidRequest(msg) => Self::InvalidRequest(msg),
            PaginationError::Store(e) => Self::Store(e),
        }
    }
}

pub type BalanceResult<T> = Result<T, BalanceStoreError>;

// ---------------------------------------------------------------------------
// Grouped balances
// ---------------------------------------------------------------------------

/// All coins of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub address: AccountAddress,
    pub coins: Coins,
}

/// Arena accumulator for per-account grouping.
///
/// Groups are kept in first-seen order; the side table maps an address to
/// its group so that a record for an already-seen account (e.g. on a later
/// page) is merged instead of starting a duplicate group.
#[derive(Debug, Default)]
pub struct BalanceGroups {
    groups: Vec<AccountBalance>,
    index: HashMap<AccountAddress, usize>,
}

impl BalanceGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, address: AccountAddress, coin: Coin) {
        if let Some(&idx) = self.index.get(&address) {
            self.groups[idx].coins.add_coin(coin);
            return;
        }
        self.index.insert(address.clone(), self.groups.len());
        self.groups.push(AccountBalance {
            address,
            coins: Coins::from(coin),
        });
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn as_slice(&self) -> &[AccountBalance] {
        &self.groups
    }

    pub fn into_vec(self) -> Vec<AccountBalance> {
        self.groups
    }
}

// ---------------------------------------------------------------------------
// BalanceStore
// ---------------------------------------------------------------------------

/// Per-account, per-denom balances under a dedicated key prefix.
#[derive(Debug, Clone)]
pub struct BalanceStore<S, C = BincodeCoinCodec> {
    store: PrefixStore<S>,
    codec: C,
}

impl<S: KvStore> BalanceStore<S> {
    /// Balance store over `store`, confined to keys starting with `prefix`.
    /// No other subsystem may write under the same prefix.
    pub fn new(store: S, prefix: &[u8]) -> Self {
        Self::with_codec(store, prefix, BincodeCoinCodec)
    }
}

impl<S: KvStore, C: CoinCodec> BalanceStore<S, C> {
    pub fn with_codec(store: S, prefix: &[u8], codec: C) -> Self {
        Self {
            store: PrefixStore::new(store, prefix.to_vec()),
            codec,
        }
    }

    /// Current balance of `denom` held by `address`; zero when no record
    /// exists.
    pub fn balance(&self, address: &AccountAddress, denom: &str) -> BalanceResult<Amount> {
        let key = keys::balance_key(address, denom);
        match self.store.get(&key)? {
            Some(bytes) => {
                let coin = decode_record(&self.codec, &key, denom, &bytes)?;
                Ok(coin.amount)
            }
            None => Ok(Amount::zero()),
        }
    }

    /// Overwrite the balance of `coin.denom` held by `address`.
    ///
    /// A zero coin deletes the record (a no-op if there was none).
    pub fn set_balance(&self, address: &AccountAddress, coin: &Coin) -> BalanceResult<()> {
        coin.validate()?;
        let key = keys::balance_key(address, &coin.denom);

        if coin.is_zero() {
            self.store.delete(&key)?;
            debug!(%address, denom = %coin.denom, "balance record deleted");
        } else {
            let bytes = self.codec.encode(coin)?;
            self.store.set(&key, &bytes)?;
            debug!(%address, %coin, "balance record written");
        }
        Ok(())
    }

    /// Add `coin` to the account's balance. Returns the new balance.
    pub fn credit(&self, address: &AccountAddress, coin: &Coin) -> BalanceResult<Amount> {
        let current = self.balance(address, &coin.denom)?;
        let updated = &current + &coin.amount;
        self.set_balance(address, &Coin::new(coin.denom.clone(), updated.clone())?)?;
        Ok(updated)
    }

    /// Remove `coin` from the account's balance. Returns the new balance.
    ///
    /// # Errors
    ///
    /// [`CoinError::InsufficientFunds`] if the balance is smaller than
    /// `coin`; the store is left untouched.
    pub fn debit(&self, address: &AccountAddress, coin: &Coin) -> BalanceResult<Amount> {
        let current = self.balance(address, &coin.denom)?;
        let updated =
            current
                .checked_sub(&coin.amount)
                .ok_or_else(|| CoinError::InsufficientFunds {
                    denom: coin.denom.clone(),
                    available: current.clone(),
                    requested: coin.amount.clone(),
                })?;
        self.set_balance(address, &Coin::new(coin.denom.clone(), updated.clone())?)?;
        Ok(updated)
    }

    /// Lazily walk every record in key order.
    ///
    /// The iterator yields `Err` and then stops at the first record whose
    /// key or value cannot be decoded: a corrupt record means the store
    /// contract was broken and nothing after it can be trusted. Drop the
    /// iterator to stop early.
    pub fn iter_all(&self) -> BalanceIter<'_, C> {
        BalanceIter {
            inner: self.store.iter_all(false),
            codec: &self.codec,
            done: false,
        }
    }

    /// One page of `address`'s balances, in the order the store walked
    /// them: ascending by denom, descending when `request.reverse` is set.
    ///
    /// Decode failures are reported as [`BalanceStoreError::InvalidRequest`]
    /// since this path serves external queries.
    pub fn paginated_balances(
        &self,
        address: &AccountAddress,
        request: &PageRequest,
    ) -> BalanceResult<(Vec<Coin>, PageResponse)> {
        let account_store = PrefixStore::new(&self.store, keys::address_prefix(address));
        let mut coins = Vec::new();

        let response = paginate(&account_store, request, |denom_bytes, value| {
            let denom = std::str::from_utf8(denom_bytes).map_err(|_| {
                BalanceStoreError::InvalidRequest("failed to paginate: non UTF-8 denom".to_string())
            })?;
            let coin = decode_record(&self.codec, denom_bytes, denom, value)
                .map_err(|e| BalanceStoreError::InvalidRequest(format!("failed to paginate: {e}")))?;
            coins.push(coin);
            Ok::<(), BalanceStoreError>(())
        })?;

        Ok((coins, response))
    }

    /// One page of records across all accounts, grouped per account.
    pub fn collect_balances_grouped(
        &self,
        request: &PageRequest,
    ) -> BalanceResult<(Vec<AccountBalance>, PageResponse)> {
        let mut groups = BalanceGroups::new();
        let response = self.accumulate_balances_grouped(&mut groups, request)?;
        Ok((groups.into_vec(), response))
    }

    /// Feed one page of records into a caller-held accumulator.
    ///
    /// Walking every page into the same [`BalanceGroups`] yields exactly one
    /// group per account no matter where page boundaries fall.
    pub fn accumulate_balances_grouped(
        &self,
        groups: &mut BalanceGroups,
        request: &PageRequest,
    ) -> BalanceResult<PageResponse> {
        paginate(&self.store, request, |key, value| {
            let (address, coin) = decode_entry(&self.codec, key, value)?;
            groups.push(address, coin);
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

fn decode_record<C: CoinCodec>(
    codec: &C,
    key: &[u8],
    denom: &str,
    value: &[u8],
) -> BalanceResult<Coin> {
    let coin = codec
        .decode(value)
        .map_err(|e| BalanceStoreError::CorruptRecord {
            key: hex::encode(key),
            reason: e.to_string(),
        })?;
    if coin.denom != denom {
        return Err(BalanceStoreError::CorruptRecord {
            key: hex::encode(key),
            reason: format!("key denom {denom} does not match record denom {}", coin.denom),
        });
    }
    if coin.is_zero() {
        return Err(BalanceStoreError::CorruptRecord {
            key: hex::encode(key),
            reason: "zero amount persisted".to_string(),
        });
    }
    Ok(coin)
}

fn decode_entry<C: CoinCodec>(
    codec: &C,
    key: &[u8],
    value: &[u8],
) -> BalanceResult<(AccountAddress, Coin)> {
    let (address, denom) =
        keys::split_balance_key(key).map_err(|source| BalanceStoreError::CorruptKey {
            key: hex::encode(key),
            source,
        })?;
    let coin = decode_record(codec, key, &denom, value)?;
    Ok((address, coin))
}

/// Iterator returned by [`BalanceStore::iter_all`].
pub struct BalanceIter<'a, C> {
    inner: KvIter<'a>,
    codec: &'a C,
    done: bool,
}

impl<'a, C: CoinCodec> Iterator for BalanceIter<'a, C> {
    type Item = BalanceResult<(AccountAddress, Coin)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let decoded = match self.inner.next()? {
            Ok((key, value)) => decode_entry(self.codec, &key, &value),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = &decoded {
            warn!(error = %e, "balance scan aborted");
            self.done = true;
        }
        Some(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::keys::BALANCES_PREFIX;
    use crate::storage::kv::MemStore;

    fn addr(n: u8) -> AccountAddress {
        AccountAddress::from_bytes(vec![n; 20]).unwrap()
    }

    fn coin(s: &str) -> Coin {
        s.parse().unwrap()
    }

    fn store() -> BalanceStore<MemStore> {
        BalanceStore::new(MemStore::new(), BALANCES_PREFIX)
    }

    fn all(store: &BalanceStore<MemStore>) -> Vec<(AccountAddress, Coin)> {
        store.iter_all().collect::<BalanceResult<Vec<_>>>().unwrap()
    }

    #[test]
    fn set_then_get() {
        let store = store();
        store.set_balance(&addr(1), &coin("150ufrm")).unwrap();

        assert_eq!(store.balance(&addr(1), "ufrm").unwrap(), Amount::from(150u64));
        assert_eq!(store.balance(&addr(1), "uatom").unwrap(), Amount::zero());
        assert_eq!(store.balance(&addr(2), "ufrm").unwrap(), Amount::zero());
    }

    #[test]
    fn zero_write_deletes_record() {
        let store = store();
        store.set_balance(&addr(1), &coin("150ufrm")).unwrap();
        store.set_balance(&addr(1), &coin("0ufrm")).unwrap();

        assert_eq!(store.balance(&addr(1), "ufrm").unwrap(), Amount::zero());
        assert!(all(&store).is_empty());
        assert!(store.store.inner().is_empty());
    }

    #[test]
    fn zero_write_on_empty_account_is_noop() {
        let store = store();
        store.set_balance(&addr(9), &coin("0utoken")).unwrap();

        assert!(all(&store).is_empty());
        assert!(store.store.inner().is_empty());
    }

    #[test]
    fn repeated_writes_are_idempotent() {
        let once = store();
        once.set_balance(&addr(1), &coin("42ufrm")).unwrap();

        let thrice = store();
        for _ in 0..3 {
            thrice.set_balance(&addr(1), &coin("42ufrm")).unwrap();
        }

        assert_eq!(all(&once), all(&thrice));
        assert_eq!(once.store.inner().len(), thrice.store.inner().len());
    }

    #[test]
    fn set_balance_rejects_invalid_denom() {
        let store = store();
        let bad = Coin {
            denom: "x".to_string(),
            amount: Amount::from(1u64),
        };
        let err = store.set_balance(&addr(1), &bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn credit_and_debit() {
        let store = store();
        assert_eq!(
            store.credit(&addr(1), &coin("100ufrm")).unwrap(),
            Amount::from(100u64)
        );
        assert_eq!(
            store.debit(&addr(1), &coin("40ufrm")).unwrap(),
            Amount::from(60u64)
        );

        let err = store.debit(&addr(1), &coin("61ufrm")).unwrap_err();
        assert!(matches!(
            err,
            BalanceStoreError::Coin(CoinError::InsufficientFunds { .. })
        ));
        assert_eq!(store.balance(&addr(1), "ufrm").unwrap(), Amount::from(60u64));

        store.debit(&addr(1), &coin("60ufrm")).unwrap();
        assert!(all(&store).is_empty());
    }

    #[test]
    fn iter_all_is_ordered_and_stoppable() {
        let store = store();
        store.set_balance(&addr(2), &coin("1bbb")).unwrap();
        store.set_balance(&addr(1), &coin("2zzz")).unwrap();
        store.set_balance(&addr(1), &coin("3aaa")).unwrap();

        let entries = all(&store);
        let flat: Vec<String> = entries
            .iter()
            .map(|(a, c)| format!("{}:{}", a.as_bytes()[0], c))
            .collect();
        assert_eq!(flat, vec!["1:3aaa", "1:2zzz", "2:1bbb"]);

        // Early termination: only what was asked for is decoded.
        let first = store.iter_all().next().unwrap().unwrap();
        assert_eq!(first.1, coin("3aaa"));
        assert_eq!(store.iter_all().take(2).count(), 2);
    }

    #[test]
    fn iter_all_surfaces_corrupt_key() {
        let backing = MemStore::new();
        let store = BalanceStore::new(&backing, BALANCES_PREFIX);
        store.set_balance(&addr(1), &coin("5ufrm")).unwrap();
        // Sorts between addr(1) and addr(3): declares a 20-byte address but
        // only 2 bytes follow.
        backing.set(&[0x01, 20, 2, 2], b"junk").unwrap();
        store.set_balance(&addr(3), &coin("5ufrm")).unwrap();

        // The scan stops at the corrupt record and never reaches addr(3).
        let results: Vec<_> = store.iter_all().collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        match &results[1] {
            Err(BalanceStoreError::CorruptKey { key, .. }) => assert_eq!(key, "140202"),
            other => panic!("expected corrupt key, got {other:?}"),
        }
        assert_eq!(results[1].as_ref().unwrap_err().kind(), ErrorKind::Internal);
    }

    #[test]
    fn iter_all_surfaces_corrupt_record() {
        let backing = MemStore::new();
        let store = BalanceStore::new(&backing, BALANCES_PREFIX);
        let key = [BALANCES_PREFIX, &keys::balance_key(&addr(1), "ufrm")[..]].concat();
        backing.set(&key, &[0xFF]).unwrap();

        let result = store.iter_all().next().unwrap();
        assert!(matches!(
            result,
            Err(BalanceStoreError::CorruptRecord { .. })
        ));
        assert!(store.balance(&addr(1), "ufrm").is_err());
    }

    #[test]
    fn record_with_mismatched_denom_is_corrupt() {
        let backing = MemStore::new();
        let store = BalanceStore::new(&backing, BALANCES_PREFIX);
        let key = [BALANCES_PREFIX, &keys::balance_key(&addr(1), "ufrm")[..]].concat();
        let bytes = BincodeCoinCodec.encode(&coin("5uatom")).unwrap();
        backing.set(&key, &bytes).unwrap();

        assert!(matches!(
            store.balance(&addr(1), "ufrm"),
            Err(BalanceStoreError::CorruptRecord { .. })
        ));
    }

    #[test]
    fn prefix_isolation() {
        let backing = MemStore::new();
        let a = BalanceStore::new(&backing, &[0x01]);
        let b = BalanceStore::new(&backing, &[0x02]);

        a.set_balance(&addr(1), &coin("10ufrm")).unwrap();
        b.set_balance(&addr(1), &coin("20ufrm")).unwrap();

        assert_eq!(a.balance(&addr(1), "ufrm").unwrap(), Amount::from(10u64));
        assert_eq!(b.balance(&addr(1), "ufrm").unwrap(), Amount::from(20u64));
        assert_eq!(a.iter_all().count(), 1);
        assert_eq!(b.iter_all().count(), 1);
    }

    #[test]
    fn paginated_balances_match_full_scan() {
        let store = store();
        for (i, denom) in ["aaa", "bbb", "ccc", "ddd", "eee", "fff", "ggg"].iter().enumerate() {
            store
                .set_balance(&addr(1), &Coin::new(*denom, (i as u64) + 1).unwrap())
                .unwrap();
            store
                .set_balance(&addr(2), &Coin::new(*denom, 100u64).unwrap())
                .unwrap();
        }

        let expected: Vec<Coin> = all(&store)
            .into_iter()
            .filter(|(a, _)| *a == addr(1))
            .map(|(_, c)| c)
            .collect();

        for limit in [1, 2, 3, 7, 50] {
            let mut request = PageRequest::with_limit(limit);
            let mut collected = Vec::new();
            loop {
                let (coins, response) = store.paginated_balances(&addr(1), &request).unwrap();
                collected.extend(coins);
                match request.next_page(&response) {
                    Some(next) => request = next,
                    None => break,
                }
            }
            assert_eq!(collected, expected, "limit {limit}");
        }
    }

    #[test]
    fn paginated_balances_default_page_counts_total() {
        let store = store();
        store.set_balance(&addr(1), &coin("1aaa")).unwrap();
        store.set_balance(&addr(1), &coin("2bbb")).unwrap();
        store.set_balance(&addr(2), &coin("3ccc")).unwrap();

        let (coins, response) = store
            .paginated_balances(&addr(1), &PageRequest::default())
            .unwrap();
        assert_eq!(coins, vec![coin("1aaa"), coin("2bbb")]);
        assert_eq!(response.total, Some(2));
        assert_eq!(response.next_key, None);
    }

    #[test]
    fn paginated_balances_decode_failure_is_invalid_request() {
        let backing = MemStore::new();
        let store = BalanceStore::new(&backing, BALANCES_PREFIX);
        let key = [BALANCES_PREFIX, &keys::balance_key(&addr(1), "ufrm")[..]].concat();
        backing.set(&key, &[0x00]).unwrap();

        let err = store
            .paginated_balances(&addr(1), &PageRequest::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn paginated_balances_rejects_key_with_offset() {
        let store = store();
        let request = PageRequest {
            key: Some(b"aaa".to_vec()),
            offset: 3,
            ..Default::default()
        };
        let err = store.paginated_balances(&addr(1), &request).unwrap_err();
        assert!(matches!(err, BalanceStoreError::InvalidRequest(_)));
    }

    #[test]
    fn reverse_page_keeps_scan_order() {
        let store = store();
        for denom in ["aaa", "bbb", "ccc"] {
            store.set_balance(&addr(1), &Coin::new(denom, 1u64).unwrap()).unwrap();
        }

        let request = PageRequest {
            limit: 2,
            reverse: true,
            ..Default::default()
        };
        let (coins, response) = store.paginated_balances(&addr(1), &request).unwrap();
        assert_eq!(coins, vec![coin("1ccc"), coin("1bbb")]);
        assert_eq!(response.next_key, Some(b"aaa".to_vec()));
    }

    fn store_with_zero_record(backing: &MemStore) -> BalanceStore<&MemStore> {
        let store = BalanceStore::new(backing, BALANCES_PREFIX);
        let key = [BALANCES_PREFIX, &keys::balance_key(&addr(1), "ufrm")[..]].concat();
        let bytes = BincodeCoinCodec.encode(&coin("0ufrm")).unwrap();
        backing.set(&key, &bytes).unwrap();
        store
    }

    #[test]
    fn persisted_zero_is_corrupt_on_scan() {
        let backing = MemStore::new();
        let store = store_with_zero_record(&backing);

        let results: Vec<_> = store.iter_all().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(BalanceStoreError::CorruptRecord { .. })
        ));
        assert!(store.balance(&addr(1), "ufrm").is_err());
    }

    #[test]
    fn persisted_zero_is_corrupt_when_grouping() {
        let backing = MemStore::new();
        let store = store_with_zero_record(&backing);

        let err = store
            .collect_balances_grouped(&PageRequest::default())
            .unwrap_err();
        assert!(matches!(err, BalanceStoreError::CorruptRecord { .. }));
    }

    #[test]
    fn persisted_zero_is_invalid_request_when_paginating() {
        let backing = MemStore::new();
        let store = store_with_zero_record(&backing);

        let err = store
            .paginated_balances(&addr(1), &PageRequest::default())
            .unwrap_err();
        assert!(matches!(err, BalanceStoreError::InvalidRequest(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn grouped_collection_any_page_size() {
        let store = store();
        let accounts = 4u8;
        let denoms = ["aaa", "bbb", "ccc"];
        for n in 1..=accounts {
            for denom in denoms {
                store
                    .set_balance(&addr(n), &Coin::new(denom, n as u64).unwrap())
                    .unwrap();
            }
        }

        for limit in 1..=13 {
            let mut groups = BalanceGroups::new();
            let mut request = PageRequest::with_limit(limit);
            loop {
                let response = store.accumulate_balances_grouped(&mut groups, &request).unwrap();
                match request.next_page(&response) {
                    Some(next) => request = next,
                    None => break,
                }
            }

            let groups = groups.into_vec();
            assert_eq!(groups.len(), accounts as usize, "limit {limit}");
            for (i, group) in groups.iter().enumerate() {
                let n = (i + 1) as u8;
                assert_eq!(group.address, addr(n));
                assert_eq!(group.coins.len(), denoms.len());
                let listed: Vec<&str> = group.coins.iter().map(|c| c.denom.as_str()).collect();
                assert_eq!(listed, denoms);
                assert!(group.coins.iter().all(|c| c.amount == Amount::from(n as u64)));
            }
        }
    }

    #[test]
    fn grouped_single_page_splits_by_account() {
        let store = store();
        store.set_balance(&addr(1), &coin("1aaa")).unwrap();
        store.set_balance(&addr(1), &coin("2bbb")).unwrap();
        store.set_balance(&addr(2), &coin("3aaa")).unwrap();

        let (groups, response) = store
            .collect_balances_grouped(&PageRequest::with_limit(2))
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].coins.to_string(), "1aaa,2bbb");
        assert!(response.next_key.is_some());
    }

    #[test]
    fn balance_groups_merge_revisited_address() {
        let mut groups = BalanceGroups::new();
        groups.push(addr(1), coin("1bbb"));
        groups.push(addr(2), coin("1aaa"));
        groups.push(addr(1), coin("1aaa"));
        groups.push(addr(1), coin("4bbb"));

        let groups = groups.into_vec();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].coins.to_string(), "1aaa,5bbb");
        assert_eq!(groups[1].coins.to_string(), "1aaa");
    }

    #[test]
    fn grouped_collection_surfaces_corrupt_key() {
        let backing = MemStore::new();
        let store = BalanceStore::new(&backing, BALANCES_PREFIX);
        backing.set(&[0x01, 0x00, b'a', b'b', b'c'], b"junk").unwrap();

        let err = store
            .collect_balances_grouped(&PageRequest::default())
            .unwrap_err();
        assert!(matches!(err, BalanceStoreError::CorruptKey { .. }));
    }
}
