//! # Ordered Key-Value Substrate
//!
//! The balance store does not talk to sled directly. It talks to the
//! [`KvStore`] trait: point `get`/`set`/`delete` plus an ordered range scan.
//! Two backends ship with the crate:
//!
//! - `sled::Tree`: the on-disk store used by [`LedgerDb`](super::db::LedgerDb).
//! - [`MemStore`]: a `BTreeMap` behind a `parking_lot::RwLock`, for tests
//!   and tooling that does not need durability.
//!
//! [`PrefixStore`] layers prefix isolation on top of any backend: every key
//! is transparently prepended with the prefix on the way in and stripped on
//! the way out, and scans never leave the prefix's key range.
//!
//! Scan order is lexicographic over raw key bytes, ascending unless
//! `reverse` is requested.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::error::ErrorKind;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors raised by a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Internal
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A raw `(key, value)` entry.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Boxed ordered iterator over a key range.
pub type KvIter<'a> = Box<dyn Iterator<Item = StoreResult<KvPair>> + 'a>;

// ---------------------------------------------------------------------------
// KvStore
// ---------------------------------------------------------------------------

/// Ordered key-value store.
///
/// Writes take `&self`: backends are expected to provide their own interior
/// synchronization (sled does, `MemStore` uses a lock), and single-key writes
/// are atomic at the backend's native granularity.
pub trait KvStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>>;

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&self, key: &[u8]) -> StoreResult<()>;

    /// Iterate over `[start, end)` in key order. `None` leaves that side
    /// unbounded.
    fn iter_range(&self, start: Option<&[u8]>, end: Option<&[u8]>, reverse: bool) -> KvIter<'_>;

    /// Iterate over every key in the store.
    fn iter_all(&self, reverse: bool) -> KvIter<'_> {
        self.iter_range(None, None, reverse)
    }
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn iter_range(&self, start: Option<&[u8]>, end: Option<&[u8]>, reverse: bool) -> KvIter<'_> {
        (**self).iter_range(start, end, reverse)
    }
}

impl<S: KvStore + ?Sized> KvStore for Arc<S> {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn iter_range(&self, start: Option<&[u8]>, end: Option<&[u8]>, reverse: bool) -> KvIter<'_> {
        (**self).iter_range(start, end, reverse)
    }
}

/// `true` when `[start, end)` cannot contain any key. Backends bail out on
/// these early because `BTreeMap::range` panics on inverted bounds.
fn is_empty_range(start: Option<&[u8]>, end: Option<&[u8]>) -> bool {
    matches!((start, end), (Some(s), Some(e)) if s >= e)
}

fn to_bounds(start: Option<&[u8]>, end: Option<&[u8]>) -> (Bound<Vec<u8>>, Bound<Vec<u8>>) {
    (
        start.map_or(Bound::Unbounded, |s| Bound::Included(s.to_vec())),
        end.map_or(Bound::Unbounded, |e| Bound::Excluded(e.to_vec())),
    )
}

// ---------------------------------------------------------------------------
// sled backend
// ---------------------------------------------------------------------------

impl KvStore for sled::Tree {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(sled::Tree::get(self, key)?.map(|v| v.to_vec()))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.insert(key, value)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.remove(key)?;
        Ok(())
    }

    fn iter_range(&self, start: Option<&[u8]>, end: Option<&[u8]>, reverse: bool) -> KvIter<'_> {
        if is_empty_range(start, end) {
            return Box::new(std::iter::empty());
        }

        let iter = self.range::<Vec<u8>, _>(to_bounds(start, end));
        let convert = |entry: sled::Result<(sled::IVec, sled::IVec)>| {
            entry
                .map(|(k, v)| (k.to_vec(), v.to_vec()))
                .map_err(StoreError::from)
        };

        if reverse {
            Box::new(iter.rev().map(convert))
        } else {
            Box::new(iter.map(convert))
        }
    }
}

// ---------------------------------------------------------------------------
// MemStore
// ---------------------------------------------------------------------------

/// In-memory ordered store.
///
/// Scans copy the requested range out under a read lock, so every iterator
/// observes one consistent snapshot regardless of concurrent writers.
#[derive(Debug, Default)]
pub struct MemStore {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn iter_range(&self, start: Option<&[u8]>, end: Option<&[u8]>, reverse: bool) -> KvIter<'_> {
        if is_empty_range(start, end) {
            return Box::new(std::iter::empty());
        }

        let entries = self.entries.read();
        let mut snapshot: Vec<KvPair> = entries
            .range(to_bounds(start, end))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        drop(entries);

        if reverse {
            snapshot.reverse();
        }
        Box::new(snapshot.into_iter().map(Ok))
    }
}

// ---------------------------------------------------------------------------
// PrefixStore
// ---------------------------------------------------------------------------

/// Smallest key strictly greater than every key starting with `prefix`, or
/// `None` if no such key exists (empty or all-`0xFF` prefix).
pub fn prefix_end_bytes(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// A view of `inner` restricted to keys starting with `prefix`.
///
/// Keys seen by callers are relative to the prefix.
#[derive(Debug, Clone)]
pub struct PrefixStore<S> {
    inner: S,
    prefix: Vec<u8>,
}

impl<S: KvStore> PrefixStore<S> {
    pub fn new(inner: S, prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            inner,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn full_key(&self, key: &[u8]) -> Vec<u8> {
        let mut full = Vec::with_capacity(self.prefix.len() + key.len());
        full.extend_from_slice(&self.prefix);
        full.extend_from_slice(key);
        full
    }
}

impl<S: KvStore> KvStore for PrefixStore<S> {
    fn get(&self, key: &[u8]) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(&self.full_key(key))
    }

    fn set(&self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.inner.set(&self.full_key(key), value)
    }

    fn delete(&self, key: &[u8]) -> StoreResult<()> {
        self.inner.delete(&self.full_key(key))
    }

    fn iter_range(&self, start: Option<&[u8]>, end: Option<&[u8]>, reverse: bool) -> KvIter<'_> {
        let start = self.full_key(start.unwrap_or_default());
        let end = match end {
            Some(end) => Some(self.full_key(end)),
            None => prefix_end_bytes(&self.prefix),
        };

        let prefix_len = self.prefix.len();
        Box::new(
            self.inner
                .iter_range(Some(start.as_slice()), end.as_deref(), reverse)
                .map(move |entry| entry.map(|(k, v)| (k[prefix_len..].to_vec(), v))),
        )
    }
}
