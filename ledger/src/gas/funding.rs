//! # Funding Calculator
//!
//! Answers "how much fee denom does this account need to submit these
//! operations?" exactly, using the deterministic gas table.
//!
//! ```text
//! required = Σ ceil(price × total_gas([op], PerOperation))   for op in operations
//!          + ceil(price × nondeterministic_gas)
//!          + amount
//! ```
//!
//! Each operation is priced as its own transaction (fixed gas included) and
//! rounded up on its own; the fee-deduction side rounds the same way, so the
//! result is never short by a rounding unit.

use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::{FixedGasPolicy, GasError, GasTable, OperationKind};
use crate::address::AccountAddress;
use crate::coin::{Amount, Coin, CoinError};
use crate::error::ErrorKind;
use crate::storage::balance_store::{BalanceStore, BalanceStoreError};
use crate::storage::codec::CoinCodec;
use crate::storage::kv::KvStore;

// ---------------------------------------------------------------------------
// Funder
// ---------------------------------------------------------------------------

/// Something that can put coins into an account: a faucet, a genesis
/// builder, or the balance store itself.
pub trait Funder {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fund(&self, address: &AccountAddress, coin: &Coin) -> Result<(), Self::Error>;
}

impl<S: KvStore, C: CoinCodec> Funder for BalanceStore<S, C> {
    type Error = BalanceStoreError;

    fn fund(&self, address: &AccountAddress, coin: &Coin) -> Result<(), Self::Error> {
        self.credit(address, coin)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FundingError {
    #[error(transparent)]
    Gas(#[from] GasError),

    #[error(transparent)]
    Coin(#[from] CoinError),

    #[error("funding {address} failed: {source}")]
    Funder {
        address: AccountAddress,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl FundingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Gas(e) => e.kind(),
            Self::Coin(e) => e.kind(),
            Self::Funder { .. } => ErrorKind::Internal,
        }
    }
}

// ---------------------------------------------------------------------------
// FundingRequest
// ---------------------------------------------------------------------------

/// What an account is about to do.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundingRequest {
    /// Deterministically priced operations, each sent as its own transaction.
    pub operations: Vec<OperationKind>,
    /// Extra gas for operations the table cannot price.
    pub nondeterministic_gas: u64,
    /// Overrides the calculator's default gas price.
    pub gas_price: Option<Decimal>,
    /// Extra amount on top of fees, e.g. tokens the account will send.
    pub amount: Option<Amount>,
}

impl FundingRequest {
    pub fn new(operations: impl Into<Vec<OperationKind>>) -> Self {
        Self {
            operations: operations.into(),
            ..Default::default()
        }
    }

    pub fn with_nondeterministic_gas(mut self, gas: u64) -> Self {
        self.nondeterministic_gas = gas;
        self
    }

    pub fn with_gas_price(mut self, price: Decimal) -> Self {
        self.gas_price = Some(price);
        self
    }

    pub fn with_amount(mut self, amount: impl Into<Amount>) -> Self {
        self.amount = Some(amount.into());
        self
    }
}

// ---------------------------------------------------------------------------
// FundingCalculator
// ---------------------------------------------------------------------------

/// Stateless calculator over an injected gas table.
#[derive(Debug, Clone)]
pub struct FundingCalculator {
    table: Arc<GasTable>,
    default_gas_price: Decimal,
    fee_denom: String,
}

impl FundingCalculator {
    pub fn new(table: Arc<GasTable>, default_gas_price: Decimal, fee_denom: impl Into<String>) -> Self {
        Self {
            table,
            default_gas_price,
            fee_denom: fee_denom.into(),
        }
    }

    pub fn gas_table(&self) -> &GasTable {
        &self.table
    }

    pub fn default_gas_price(&self) -> Decimal {
        self.default_gas_price
    }

    pub fn fee_denom(&self) -> &str {
        &self.fee_denom
    }

    /// Exact amount of fee denom `request` needs.
    ///
    /// # Errors
    ///
    /// - [`GasError::InvalidGasPrice`] for a negative price, before
    ///   anything is computed.
    /// - [`GasError::UnsupportedOperation`] if any operation is unpriced.
    pub fn required_funding(&self, request: &FundingRequest) -> Result<Amount, GasError> {
        let price = request.gas_price.unwrap_or(self.default_gas_price);
        if price < Decimal::ZERO {
            return Err(GasError::InvalidGasPrice(price.to_string()));
        }

        let mut total = Amount::zero();
        for &op in &request.operations {
            let gas = self.table.total_gas(&[op], FixedGasPolicy::PerOperation)?;
            total += fee_for_gas(price, gas)?;
        }
        total += fee_for_gas(price, request.nondeterministic_gas)?;
        if let Some(amount) = &request.amount {
            total += amount;
        }

        debug!(
            operations = request.operations.len(),
            nondeterministic_gas = request.nondeterministic_gas,
            %price,
            required = %total,
            "computed required funding"
        );
        Ok(total)
    }

    /// [`required_funding`](Self::required_funding) in the fee denom.
    pub fn required_funding_coin(&self, request: &FundingRequest) -> Result<Coin, FundingError> {
        let amount = self.required_funding(request)?;
        Ok(Coin::new(self.fee_denom.clone(), amount)?)
    }

    /// Compute what `address` needs for `request` and hand it to `funder`.
    /// Returns the coin that was funded.
    pub fn fund_account<F: Funder>(
        &self,
        funder: &F,
        address: &AccountAddress,
        request: &FundingRequest,
    ) -> Result<Coin, FundingError> {
        let coin = self.required_funding_coin(request)?;
        self.deliver(funder, address, &coin)?;
        Ok(coin)
    }

    /// Fund several accounts. Every requirement is computed before the first
    /// coin moves, so a bad request funds nobody.
    pub fn fund_accounts<F: Funder>(
        &self,
        funder: &F,
        requests: &[(AccountAddress, FundingRequest)],
    ) -> Result<Vec<Coin>, FundingError> {
        let coins = requests
            .iter()
            .map(|(_, request)| self.required_funding_coin(request))
            .collect::<Result<Vec<_>, _>>()?;

        for ((address, _), coin) in requests.iter().zip(&coins) {
            self.deliver(funder, address, coin)?;
        }
        Ok(coins)
    }

    fn deliver<F: Funder>(
        &self,
        funder: &F,
        address: &AccountAddress,
        coin: &Coin,
    ) -> Result<(), FundingError> {
        if coin.is_zero() {
            return Ok(());
        }
        funder
            .fund(address, coin)
            .map_err(|e| FundingError::Funder {
                address: address.clone(),
                source: Box::new(e),
            })?;
        info!(%address, %coin, "account funded");
        Ok(())
    }
}

/// `ceil(price × gas)` as an integer amount.
fn fee_for_gas(price: Decimal, gas: u64) -> Result<Amount, GasError> {
    let fee = price
        .checked_mul(Decimal::from(gas))
        .ok_or(GasError::Overflow)?
        .ceil();
    fee.to_u128().map(Amount::from).ok_or(GasError::Overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gas::OperationKind::{AuthzExec, BankSend, StakingDelegate};
    use crate::storage::keys::BALANCES_PREFIX;
    use crate::storage::kv::MemStore;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    /// `{A: 100, B: 50}` with fixed gas 10, default price 0.5.
    fn calculator() -> FundingCalculator {
        let table = GasTable::new(10, [(BankSend, 100), (StakingDelegate, 50)]);
        FundingCalculator::new(Arc::new(table), dec("0.5"), "ufrm")
    }

    fn addr(n: u8) -> AccountAddress {
        AccountAddress::from_bytes(vec![n; 20]).unwrap()
    }

    #[test]
    fn concrete_scenario() {
        let calc = calculator();
        let request = FundingRequest::new([BankSend, StakingDelegate]);

        // ceil(0.5 × 110) + ceil(0.5 × 60)
        assert_eq!(calc.required_funding(&request).unwrap(), Amount::from(85u64));
    }

    #[test]
    fn rounds_up_per_operation() {
        let calc = calculator();
        let request = FundingRequest::new([BankSend, StakingDelegate]).with_gas_price(dec("0.01"));
        // ceil(1.1) + ceil(0.6), not ceil(1.7)
        assert_eq!(calc.required_funding(&request).unwrap(), Amount::from(3u64));
    }

    #[test]
    fn nondeterministic_gas_and_amount_are_added() {
        let calc = calculator();
        let request = FundingRequest::new([BankSend])
            .with_nondeterministic_gas(3)
            .with_amount(1_000u64);
        // ceil(0.5 × 110) + ceil(0.5 × 3) + 1000
        assert_eq!(calc.required_funding(&request).unwrap(), Amount::from(1_057u64));
    }

    #[test]
    fn empty_request_is_zero() {
        let calc = calculator();
        assert_eq!(
            calc.required_funding(&FundingRequest::default()).unwrap(),
            Amount::zero()
        );
    }

    #[test]
    fn monotone_in_inputs() {
        let calc = calculator();
        let base = FundingRequest::new([BankSend]);
        let base_amount = calc.required_funding(&base).unwrap();

        let more_ops = FundingRequest::new([BankSend, BankSend]);
        let higher_price = base.clone().with_gas_price(dec("0.75"));
        let more_amount = base.clone().with_amount(1u64);
        let more_gas = base.clone().with_nondeterministic_gas(1);

        for request in [more_ops, higher_price, more_amount, more_gas] {
            assert!(calc.required_funding(&request).unwrap() >= base_amount);
        }
    }

    #[test]
    fn unknown_operation_rejected() {
        let calc = calculator();
        let request = FundingRequest::new([BankSend, AuthzExec]);
        let err = calc.required_funding(&request).unwrap_err();
        assert!(matches!(err, GasError::UnsupportedOperation(AuthzExec)));
        assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    }

    #[test]
    fn negative_gas_price_rejected() {
        let calc = calculator();
        let request = FundingRequest::new([BankSend]).with_gas_price(dec("-0.1"));
        let err = calc.required_funding(&request).unwrap_err();
        assert!(matches!(err, GasError::InvalidGasPrice(_)));
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn default_table_price() {
        let calc = FundingCalculator::new(Arc::new(GasTable::default()), dec("0.0625"), "ufrm");
        let request = FundingRequest::new([BankSend]);
        // ceil(0.0625 × (50000 + 65000)) = ceil(7187.5)
        assert_eq!(calc.required_funding(&request).unwrap(), Amount::from(7_188u64));

        let coin = calc.required_funding_coin(&request).unwrap();
        assert_eq!(coin.to_string(), "7188ufrm");
    }

    #[test]
    fn fund_account_credits_balance_store() {
        let calc = calculator();
        let store = BalanceStore::new(MemStore::new(), BALANCES_PREFIX);
        store
            .set_balance(&addr(1), &Coin::new("ufrm", 15u64).unwrap())
            .unwrap();

        let funded = calc
            .fund_account(&store, &addr(1), &FundingRequest::new([BankSend, StakingDelegate]))
            .unwrap();
        assert_eq!(funded, Coin::new("ufrm", 85u64).unwrap());
        assert_eq!(store.balance(&addr(1), "ufrm").unwrap(), Amount::from(100u64));
    }

    #[test]
    fn fund_accounts_validates_everything_first() {
        let calc = calculator();
        let store = BalanceStore::new(MemStore::new(), BALANCES_PREFIX);
        let requests = vec![
            (addr(1), FundingRequest::new([BankSend])),
            (addr(2), FundingRequest::new([AuthzExec])),
        ];

        assert!(calc.fund_accounts(&store, &requests).is_err());
        assert_eq!(store.iter_all().count(), 0);

        let requests = vec![
            (addr(1), FundingRequest::new([BankSend])),
            (addr(2), FundingRequest::default()),
        ];
        let coins = calc.fund_accounts(&store, &requests).unwrap();
        assert_eq!(coins[0].amount, Amount::from(55u64));
        assert!(coins[1].is_zero());
        // Zero requirements are not written.
        assert_eq!(store.iter_all().count(), 1);
    }

    #[test]
    fn request_json_form() {
        let request: FundingRequest = serde_json::from_str(
            r#"{"operations": ["bank.send"], "gas_price": "0.5", "amount": "10"}"#,
        )
        .unwrap();
        assert_eq!(request.operations, vec![BankSend]);
        assert_eq!(request.gas_price, Some(dec("0.5")));
        assert_eq!(request.amount, Some(Amount::from(10u64)));
        assert_eq!(request.nondeterministic_gas, 0);
    }
}
