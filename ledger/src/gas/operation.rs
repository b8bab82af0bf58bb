//! Closed set of operation kinds the gas table can price.
//!
//! Every kind has a stable dotted string tag (`"bank.send"`). The tag is the
//! only form that ever leaves the process: config files, CLI arguments and
//! JSON output all use it, so renaming a tag is a breaking change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::GasError;

macro_rules! operation_kinds {
    ($($variant:ident => $tag:literal),+ $(,)?) => {
        /// A message type submitted in a transaction.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "&'static str")]
        pub enum OperationKind {
            $($variant,)+
        }

        impl OperationKind {
            /// Every operation kind, in declaration order.
            pub const ALL: &'static [OperationKind] = &[$(OperationKind::$variant,)+];

            /// The stable string tag.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(OperationKind::$variant => $tag,)+
                }
            }
        }

        impl FromStr for OperationKind {
            type Err = GasError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(OperationKind::$variant),)+
                    other => Err(GasError::UnknownOperation(other.to_string())),
                }
            }
        }
    };
}

operation_kinds! {
    // bank
    BankSend => "bank.send",
    BankMultiSend => "bank.multi_send",

    // fungible-token assets
    AssetFtIssue => "asset.ft.issue",
    AssetFtMint => "asset.ft.mint",
    AssetFtBurn => "asset.ft.burn",
    AssetFtFreeze => "asset.ft.freeze",
    AssetFtUnfreeze => "asset.ft.unfreeze",
    AssetFtGloballyFreeze => "asset.ft.globally_freeze",
    AssetFtGloballyUnfreeze => "asset.ft.globally_unfreeze",
    AssetFtSetWhitelistedLimit => "asset.ft.set_whitelisted_limit",

    // staking
    StakingDelegate => "staking.delegate",
    StakingUndelegate => "staking.undelegate",
    StakingBeginRedelegate => "staking.begin_redelegate",
    StakingCreateValidator => "staking.create_validator",
    StakingEditValidator => "staking.edit_validator",

    // distribution
    DistributionFundCommunityPool => "distribution.fund_community_pool",
    DistributionSetWithdrawAddress => "distribution.set_withdraw_address",
    DistributionWithdrawDelegatorReward => "distribution.withdraw_delegator_reward",
    DistributionWithdrawValidatorCommission => "distribution.withdraw_validator_commission",

    // governance
    GovSubmitProposal => "gov.submit_proposal",
    GovVote => "gov.vote",
    GovVoteWeighted => "gov.vote_weighted",
    GovDeposit => "gov.deposit",

    // slashing
    SlashingUnjail => "slashing.unjail",

    // authz
    AuthzGrant => "authz.grant",
    AuthzRevoke => "authz.revoke",
    AuthzExec => "authz.exec",

    // feegrant
    FeegrantGrantAllowance => "feegrant.grant_allowance",
    FeegrantRevokeAllowance => "feegrant.revoke_allowance",

    // wasm
    WasmStoreCode => "wasm.store_code",
    WasmInstantiateContract => "wasm.instantiate_contract",
    WasmExecuteContract => "wasm.execute_contract",
    WasmMigrateContract => "wasm.migrate_contract",
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for OperationKind {
    type Error = GasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OperationKind> for &'static str {
    fn from(kind: OperationKind) -> Self {
        kind.as_str()
    }
}
