//! # Deterministic Gas Table
//!
//! Gas for most operations is not metered, it is looked up. Every node
//! charges exactly the table value, so fee estimates made off-chain are
//! exact rather than simulated.
//!
//! A transaction's gas limit is the sum of its operations' table entries
//! plus [`GasTable::fixed_gas`], which covers signature verification and
//! other per-transaction overhead. How often the fixed part is added is
//! the [`FixedGasPolicy`].
//!
//! Operations whose cost depends on execution (contract calls, nested
//! `authz.exec`) deliberately have no entry. Asking for their gas is an
//! error; callers account for them through the funding request's
//! nondeterministic gas instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{GasError, OperationKind};
use crate::config::DEFAULT_FIXED_GAS;

/// How [`GasTable::fixed_gas`] is applied to a batch of operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedGasPolicy {
    /// One transaction per operation: fixed gas for each.
    #[default]
    PerOperation,
    /// All operations in a single transaction: fixed gas once.
    OncePerBatch,
}

/// Immutable operation-kind → gas mapping plus the fixed per-transaction
/// overhead.
///
/// Built once (default or from config) and shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasTable {
    fixed_gas: u64,
    operations: BTreeMap<OperationKind, u64>,
}

impl GasTable {
    pub fn new(fixed_gas: u64, operations: impl IntoIterator<Item = (OperationKind, u64)>) -> Self {
        Self {
            fixed_gas,
            operations: operations.into_iter().collect(),
        }
    }

    /// Parse a table from its JSON form:
    /// `{"fixed_gas": 65000, "operations": {"bank.send": 50000}}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn fixed_gas(&self) -> u64 {
        self.fixed_gas
    }

    /// Gas of one operation, `None` if the kind is not deterministically
    /// priced.
    pub fn gas_for_operation(&self, kind: OperationKind) -> Option<u64> {
        self.operations.get(&kind).copied()
    }

    /// Priced operations in tag order.
    pub fn entries(&self) -> impl Iterator<Item = (OperationKind, u64)> + '_ {
        self.operations.iter().map(|(kind, gas)| (*kind, *gas))
    }

    /// Gas limit for `operations` under `policy`.
    ///
    /// # Errors
    ///
    /// - [`GasError::UnsupportedOperation`] at the first operation without
    ///   an entry. Nothing is summed past it.
    /// - [`GasError::Overflow`] if the total does not fit in a `u64`.
    pub fn total_gas(
        &self,
        operations: &[OperationKind],
        policy: FixedGasPolicy,
    ) -> Result<u64, GasError> {
        let mut total: u64 = 0;
        for &kind in operations {
            let gas = self
                .gas_for_operation(kind)
                .ok_or(GasError::UnsupportedOperation(kind))?;
            let step = match policy {
                FixedGasPolicy::PerOperation => {
                    gas.checked_add(self.fixed_gas).ok_or(GasError::Overflow)?
                }
                FixedGasPolicy::OncePerBatch => gas,
            };
            total = total.checked_add(step).ok_or(GasError::Overflow)?;
        }

        if policy == FixedGasPolicy::OncePerBatch {
            total = total.checked_add(self.fixed_gas).ok_or(GasError::Overflow)?;
        }
        Ok(total)
    }
}

impl Default for GasTable {
    /// The network's built-in table.
    fn default() -> Self {
        use crate::gas::OperationKind::*;

        Self::new(
            DEFAULT_FIXED_GAS,
            [
                (BankSend, 50_000),
                (BankMultiSend, 35_000),
                (AssetFtIssue, 80_000),
                (AssetFtMint, 35_000),
                (AssetFtBurn, 35_000),
                (AssetFtFreeze, 55_000),
                (AssetFtUnfreeze, 55_000),
                (AssetFtGloballyFreeze, 5_000),
                (AssetFtGloballyUnfreeze, 5_000),
                (AssetFtSetWhitelistedLimit, 35_000),
                (StakingDelegate, 83_000),
                (StakingUndelegate, 112_000),
                (StakingBeginRedelegate, 142_000),
                (StakingCreateValidator, 117_000),
                (StakingEditValidator, 13_000),
                (DistributionFundCommunityPool, 15_000),
                (DistributionSetWithdrawAddress, 5_000),
                (DistributionWithdrawDelegatorReward, 65_000),
                (DistributionWithdrawValidatorCommission, 22_000),
                (GovSubmitProposal, 95_000),
                (GovVote, 8_000),
                (GovVoteWeighted, 11_000),
                (GovDeposit, 91_000),
                (SlashingUnjail, 25_000),
                (AuthzGrant, 28_000),
                (AuthzRevoke, 8_000),
                (FeegrantGrantAllowance, 10_000),
                (FeegrantRevokeAllowance, 2_500),
            ],
        )
    }
}
