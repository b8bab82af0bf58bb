//! Binary codec for persisted coin records.
//!
//! Bincode is compact, fast and deterministic, which is all a consensus
//! store needs. The codec sits behind [`CoinCodec`] so the balance store can
//! be pointed at a different wire format without touching its logic.

use crate::coin::Coin;

use super::kv::StoreError;

/// Reversible encoding of a [`Coin`]. Implementations must round-trip
/// exactly: `decode(encode(c)) == c` for every valid coin.
pub trait CoinCodec {
    fn encode(&self, coin: &Coin) -> Result<Vec<u8>, StoreError>;

    /// Decode and validate a record.
    fn decode(&self, bytes: &[u8]) -> Result<Coin, StoreError>;
}

/// The default record codec, bincode 1.x with its standard options.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCoinCodec;

impl CoinCodec for BincodeCoinCodec {
    fn encode(&self, coin: &Coin) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(coin).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Coin, StoreError> {
        let coin: Coin =
            bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))?;
        coin.validate()
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(coin)
    }
}
