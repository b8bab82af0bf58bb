//! Sorted, denom-unique coin sets.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Amount, Coin, CoinError};

/// One account's multi-token balance.
///
/// Invariant: sorted by denom, no duplicate denoms, no zero amounts. Every
/// constructor and mutator re-establishes it, so a `Coins` value obtained
/// from anywhere (including deserialization) can be trusted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coin>", into = "Vec<Coin>")]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Build a set from an arbitrary list. Zero coins are dropped, the rest
    /// sorted; a denom appearing twice is an error rather than being summed,
    /// since it almost always signals a bug in the caller.
    pub fn new(coins: Vec<Coin>) -> Result<Self, CoinError> {
        let mut coins: Vec<Coin> = coins.into_iter().filter(|c| !c.is_zero()).collect();
        for coin in &coins {
            coin.validate()?;
        }
        coins.sort_by(|a, b| a.denom.cmp(&b.denom));
        if let Some(pair) = coins.windows(2).find(|w| w[0].denom == w[1].denom) {
            return Err(CoinError::DuplicateDenom(pair[0].denom.clone()));
        }
        Ok(Self(coins))
    }

    /// Merge a single coin in, summing with an existing entry of the same
    /// denom. Zero coins are ignored.
    pub fn add_coin(&mut self, coin: Coin) {
        if coin.is_zero() {
            return;
        }
        match self.0.binary_search_by(|c| c.denom.as_str().cmp(&coin.denom)) {
            Ok(idx) => self.0[idx].amount += coin.amount,
            Err(idx) => self.0.insert(idx, coin),
        }
    }

    /// Sum of two sets, merged by denom.
    #[must_use]
    pub fn add(mut self, other: Coins) -> Coins {
        for coin in other.0 {
            self.add_coin(coin);
        }
        self
    }

    /// Subtract a single coin. Fails if the set holds less than requested;
    /// an entry that reaches zero is removed.
    pub fn checked_sub_coin(&mut self, coin: &Coin) -> Result<(), CoinError> {
        if coin.is_zero() {
            return Ok(());
        }
        let idx = self.0.binary_search_by(|c| c.denom.as_str().cmp(&coin.denom));
        let available = match idx {
            Ok(i) => self.0[i].amount.clone(),
            Err(_) => Amount::zero(),
        };
        let remaining =
            available
                .checked_sub(&coin.amount)
                .ok_or_else(|| CoinError::InsufficientFunds {
                    denom: coin.denom.clone(),
                    available: available.clone(),
                    requested: coin.amount.clone(),
                })?;

        // available >= coin.amount > 0, so the entry exists.
        if let Ok(i) = idx {
            if remaining.is_zero() {
                self.0.remove(i);
            } else {
                self.0[i].amount = remaining;
            }
        }
        Ok(())
    }

    /// Amount held of `denom`, zero if absent.
    pub fn amount_of(&self, denom: &str) -> Amount {
        self.0
            .binary_search_by(|c| c.denom.as_str().cmp(denom))
            .map(|i| self.0[i].amount.clone())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coin> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Coin> {
        self.0
    }
}

impl TryFrom<Vec<Coin>> for Coins {
    type Error = CoinError;

    fn try_from(coins: Vec<Coin>) -> Result<Self, Self::Error> {
        Coins::new(coins)
    }
}

impl From<Coins> for Vec<Coin> {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl From<Coin> for Coins {
    fn from(coin: Coin) -> Self {
        let mut coins = Coins::empty();
        coins.add_coin(coin);
        coins
    }
}

impl<'a> IntoIterator for &'a Coins {
    type Item = &'a Coin;
    type IntoIter = std::slice::Iter<'a, Coin>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, coin) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{coin}")?;
        }
        Ok(())
    }
}
