//! # Key-Range Pagination
//!
//! Query paths never load a whole key range at once. They walk it a page at
//! a time with a [`PageRequest`] and hand the returned
//! [`PageResponse::next_key`] back in to continue.
//!
//! Two modes, mutually exclusive:
//!
//! - **Key-based** (`key` set): resume at `key` (inclusive). Cheap, no
//!   counting; `total` is never reported.
//! - **Offset-based** (`key` unset): skip `offset` entries. When
//!   `count_total` is set the walk continues past the page to count every
//!   entry in the range.
//!
//! A zero `limit` means [`DEFAULT_PAGE_LIMIT`] and also turns `count_total`
//! on, so that a caller sending an empty request learns the range size.
//!
//! Keys in requests and responses are relative to the store being
//! paginated (for a [`PrefixStore`](super::kv::PrefixStore) that means
//! without its prefix).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::DEFAULT_PAGE_LIMIT;

use super::kv::{KvStore, StoreError};

/// Pagination parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Continuation key returned by a previous page.
    pub key: Option<Vec<u8>>,
    /// Number of entries to skip. Only valid without `key`.
    pub offset: u64,
    /// Page size; zero means the default.
    pub limit: u64,
    /// Report the number of entries in the whole range.
    pub count_total: bool,
    /// Walk the range in descending key order.
    pub reverse: bool,
}

impl PageRequest {
    /// First page of `limit` entries.
    pub fn with_limit(limit: u64) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }

    /// Continue after a previous page.
    pub fn next_page(&self, response: &PageResponse) -> Option<Self> {
        response.next_key.as_ref().map(|key| Self {
            key: Some(key.clone()),
            offset: 0,
            limit: self.limit,
            count_total: false,
            reverse: self.reverse,
        })
    }
}

/// Pagination result metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResponse {
    /// Key of the first entry not returned, `None` once the range is done.
    pub next_key: Option<Vec<u8>>,
    /// Entries in the whole range, when requested and available.
    pub total: Option<u64>,
}

/// Errors raised by [`paginate`] itself, independent of the entry handler.
#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("invalid page request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Walk one page of `store`, calling `on_entry` with every `(key, value)`
/// on the page in scan order.
///
/// Any error from `on_entry` aborts the walk and is returned as is.
pub fn paginate<S, E, F>(store: &S, request: &PageRequest, mut on_entry: F) -> Result<PageResponse, E>
where
    S: KvStore + ?Sized,
    E: From<PaginationError>,
    F: FnMut(&[u8], &[u8]) -> Result<(), E>,
{
    if request.key.is_some() && request.offset > 0 {
        return Err(PaginationError::InvalidRequest(
            "either offset or key is expected, got both".to_string(),
        )
        .into());
    }

    let (limit, count_total) = if request.limit == 0 {
        (DEFAULT_PAGE_LIMIT, true)
    } else {
        (request.limit, request.count_total)
    };

    if let Some(key) = &request.key {
        let iter = if request.reverse {
            // Inclusive upper bound: `key ++ 0x00` is the smallest key after `key`.
            let mut end = key.clone();
            end.push(0);
            store.iter_range(None, Some(end.as_slice()), true)
        } else {
            store.iter_range(Some(key.as_slice()), None, false)
        };

        let mut count = 0u64;
        let mut next_key = None;
        for entry in iter {
            let (k, v) = entry.map_err(PaginationError::from)?;
            count += 1;
            if count > limit {
                next_key = Some(k);
                break;
            }
            on_entry(&k, &v)?;
        }

        return Ok(PageResponse {
            next_key,
            total: None,
        });
    }

    let end = request.offset.checked_add(limit).ok_or_else(|| {
        PaginationError::InvalidRequest(format!(
            "offset {} plus limit {} overflows",
            request.offset, limit
        ))
    })?;

    let mut count = 0u64;
    let mut next_key = None;
    for entry in store.iter_all(request.reverse) {
        let (k, v) = entry.map_err(PaginationError::from)?;
        count += 1;

        if count <= request.offset {
            continue;
        }
        if count <= end {
            on_entry(&k, &v)?;
        } else if count - 1 == end {
            next_key = Some(k);
            if !count_total {
                break;
            }
        }
    }

    Ok(PageResponse {
        next_key,
        total: count_total.then_some(count),
    })
}
