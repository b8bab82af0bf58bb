//! # CLI Interface
//!
//! Defines the command-line argument structure for `ferrum` using `clap`
//! derive. Subcommands: `gas`, `funding`, `balance`, and `version`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

use ferrum_ledger::gas::{FixedGasPolicy, FundingRequest, OperationKind};
use ferrum_ledger::storage::pagination::PageRequest;
use ferrum_ledger::{AccountAddress, Amount, Coin};

use crate::logging::LogFormat;

/// Ferrum ledger operator tool.
///
/// Computes deterministic gas and funding requirements and inspects or
/// edits balances in a ledger database.
#[derive(Parser, Debug)]
#[command(
    name = "ferrum",
    about = "Ferrum ledger operator tool",
    version,
    propagate_version = true
)]
pub struct FerrumCli {
    /// Path to the ledger configuration file (JSON).
    ///
    /// When omitted, built-in defaults are used.
    #[arg(long, short = 'c', global = true, env = "FERRUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Gas limit of a batch of operations, or the whole gas table.
    Gas(GasArgs),
    /// Fee-denom amount an account needs for a set of operations.
    Funding(FundingArgs),
    /// Inspect or edit balances in a ledger database.
    Balance(BalanceArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `gas` subcommand.
#[derive(Args, Debug)]
pub struct GasArgs {
    /// Operation tags, e.g. `bank.send staking.delegate`.
    #[arg(required_unless_present = "list")]
    pub operations: Vec<OperationKind>,

    /// Add the fixed gas once for the whole batch instead of once per
    /// operation.
    #[arg(long)]
    pub once_per_batch: bool,

    /// Print every priced operation instead.
    #[arg(long, conflicts_with = "operations")]
    pub list: bool,
}

impl GasArgs {
    pub fn policy(&self) -> FixedGasPolicy {
        if self.once_per_batch {
            FixedGasPolicy::OncePerBatch
        } else {
            FixedGasPolicy::PerOperation
        }
    }
}

/// Arguments describing a funding request.
#[derive(Args, Debug, Clone)]
pub struct FundingArgs {
    /// Operation tags, each priced as its own transaction.
    pub operations: Vec<OperationKind>,

    /// Extra gas for operations without a deterministic price.
    #[arg(long, default_value_t = 0)]
    pub nondeterministic_gas: u64,

    /// Gas price override, e.g. `0.0625`.
    #[arg(long)]
    pub gas_price: Option<Decimal>,

    /// Extra amount on top of fees, in the fee denom's smallest unit.
    #[arg(long)]
    pub amount: Option<Amount>,
}

impl FundingArgs {
    pub fn to_request(&self) -> FundingRequest {
        FundingRequest {
            operations: self.operations.clone(),
            nondeterministic_gas: self.nondeterministic_gas,
            gas_price: self.gas_price,
            amount: self.amount.clone(),
        }
    }
}

/// Arguments for the `balance` subcommand.
#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Path to the ledger database directory.
    #[arg(long, short = 'd', env = "FERRUM_DB", default_value = "ferrum-db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: BalanceCommand,
}

#[derive(Subcommand, Debug)]
pub enum BalanceCommand {
    /// Balance of one denom.
    Get {
        address: AccountAddress,
        denom: String,
    },
    /// Overwrite a balance, e.g. `1500ufrm`. Zero deletes it.
    Set { address: AccountAddress, coin: Coin },
    /// One page of an account's balances.
    List {
        address: AccountAddress,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Stream every balance record as JSON lines.
    Export,
    /// Credit an account with what it needs for a funding request.
    Fund {
        address: AccountAddress,
        #[command(flatten)]
        funding: FundingArgs,
    },
}

/// Pagination flags.
#[derive(Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Continuation key from a previous page (hex).
    #[arg(long, conflicts_with = "offset")]
    pub key: Option<String>,

    #[arg(long, default_value_t = 0)]
    pub offset: u64,

    /// Page size; 0 means the default page size.
    #[arg(long, default_value_t = 0)]
    pub limit: u64,

    #[arg(long)]
    pub count_total: bool,

    #[arg(long)]
    pub reverse: bool,
}

impl PageArgs {
    pub fn to_page_request(&self) -> Result<PageRequest> {
        let key = self
            .key
            .as_deref()
            .map(hex::decode)
            .transpose()
            .context("page key must be hex")?;
        Ok(PageRequest {
            key,
            offset: self.offset,
            limit: self.limit,
            count_total: self.count_total,
            reverse: self.reverse,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        FerrumCli::command().debug_assert();
    }

    #[test]
    fn parses_gas_operations() {
        let cli = FerrumCli::try_parse_from([
            "ferrum",
            "gas",
            "bank.send",
            "staking.delegate",
            "--once-per-batch",
        ])
        .unwrap();

        match cli.command {
            Commands::Gas(args) => {
                assert_eq!(
                    args.operations,
                    vec![OperationKind::BankSend, OperationKind::StakingDelegate]
                );
                assert_eq!(args.policy(), FixedGasPolicy::OncePerBatch);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_operation() {
        assert!(FerrumCli::try_parse_from(["ferrum", "gas", "bank.burn"]).is_err());
    }

    #[test]
    fn parses_funding_request() {
        let cli = FerrumCli::try_parse_from([
            "ferrum",
            "--log-format",
            "json",
            "funding",
            "bank.send",
            "--gas-price",
            "0.5",
            "--amount",
            "1000",
            "--nondeterministic-gas",
            "3",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);

        let Commands::Funding(args) = cli.command else {
            panic!("expected funding");
        };
        let request = args.to_request();
        assert_eq!(request.operations, vec![OperationKind::BankSend]);
        assert_eq!(request.gas_price, Some(Decimal::new(5, 1)));
        assert_eq!(request.amount, Some(Amount::from(1_000u64)));
        assert_eq!(request.nondeterministic_gas, 3);
    }

    #[test]
    fn page_args_decode_hex_key() {
        let page = PageArgs {
            key: Some("75667271".to_string()),
            limit: 5,
            ..Default::default()
        };
        let request = page.to_page_request().unwrap();
        assert_eq!(request.key, Some(b"ufrq".to_vec()));
        assert_eq!(request.limit, 5);

        let bad = PageArgs {
            key: Some("zz".to_string()),
            ..Default::default()
        };
        assert!(bad.to_page_request().is_err());
    }

    #[test]
    fn balance_set_parses_coin() {
        let address = AccountAddress::from_bytes(vec![1u8; 20]).unwrap();
        let bech32 = address.to_bech32();
        let cli = FerrumCli::try_parse_from([
            "ferrum",
            "balance",
            "--db",
            "/tmp/db",
            "set",
            bech32.as_str(),
            "1500ufrm",
        ])
        .unwrap();

        let Commands::Balance(args) = cli.command else {
            panic!("expected balance");
        };
        match args.command {
            BalanceCommand::Set { address: parsed, coin } => {
                assert_eq!(parsed, address);
                assert_eq!(coin.to_string(), "1500ufrm");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
