// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Ferrum Operator Tool
//!
//! Entry point for the `ferrum` binary. Parses CLI arguments, initializes
//! logging, loads the ledger config, and runs one command.
//!
//! - `gas`     : gas limit of a batch of operations, or the gas table
//! - `funding` : exact funding an account needs
//! - `balance` : get/set/list/export/fund balances in a ledger database
//! - `version` : print build version information
//!
//! Command output goes to stdout as JSON; logs go to stderr.

mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::io::Write;
use std::path::Path;

use ferrum_ledger::config::LedgerConfig;
use ferrum_ledger::storage::db::LedgerDb;
use ferrum_ledger::storage::pagination::PageResponse;

use cli::{BalanceArgs, BalanceCommand, Commands, FerrumCli, FundingArgs, GasArgs};

fn main() -> Result<()> {
    let cli = FerrumCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Gas(args) => show_gas(&config, args),
        Commands::Funding(args) => show_funding(&config, args),
        Commands::Balance(args) => run_balance(&config, args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Load and validate the config file, or fall back to built-in defaults.
fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    match path {
        Some(path) => {
            let config = LedgerConfig::load(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            tracing::info!(path = %path.display(), "config loaded");
            Ok(config)
        }
        None => Ok(LedgerConfig::default()),
    }
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn page_json(response: &PageResponse) -> serde_json::Value {
    json!({
        "next_key": response.next_key.as_ref().map(hex::encode),
        "total": response.total,
    })
}

// ---------------------------------------------------------------------------
// gas / funding
// ---------------------------------------------------------------------------

fn show_gas(config: &LedgerConfig, args: GasArgs) -> Result<()> {
    let table = config.gas_table();

    if args.list {
        let operations: serde_json::Map<String, serde_json::Value> = table
            .entries()
            .map(|(kind, gas)| (kind.to_string(), json!(gas)))
            .collect();
        return print_json(&json!({
            "fixed_gas": table.fixed_gas(),
            "operations": operations,
        }));
    }

    let policy = args.policy();
    let gas = table
        .total_gas(&args.operations, policy)
        .context("failed to compute gas")?;
    print_json(&json!({
        "operations": args.operations,
        "policy": policy,
        "gas": gas,
    }))
}

fn show_funding(config: &LedgerConfig, args: FundingArgs) -> Result<()> {
    let calculator = config.funding_calculator()?;
    let request = args.to_request();
    let coin = calculator
        .required_funding_coin(&request)
        .context("failed to compute required funding")?;

    print_json(&json!({
        "request": request,
        "required": coin,
    }))
}

// ---------------------------------------------------------------------------
// balance
// ---------------------------------------------------------------------------

fn run_balance(config: &LedgerConfig, args: BalanceArgs) -> Result<()> {
    let db = LedgerDb::open(&args.db)
        .with_context(|| format!("failed to open database at {}", args.db.display()))?;
    let balances = db.balances();

    match args.command {
        BalanceCommand::Get { address, denom } => {
            let amount = balances.balance(&address, &denom)?;
            print_json(&json!({
                "address": address,
                "denom": denom,
                "amount": amount,
            }))
        }
        BalanceCommand::Set { address, coin } => {
            balances.set_balance(&address, &coin)?;
            db.flush()?;
            tracing::info!(%address, %coin, "balance set");
            print_json(&json!({ "address": address, "balance": coin }))
        }
        BalanceCommand::List { address, page } => {
            let request = page.to_page_request()?;
            let (coins, response) = balances
                .paginated_balances(&address, &request)
                .with_context(|| format!("failed to list balances of {address}"))?;
            print_json(&json!({
                "address": address,
                "balances": coins,
                "pagination": page_json(&response),
            }))
        }
        BalanceCommand::Export => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let mut records = 0u64;
            for entry in balances.iter_all() {
                let (address, coin) = entry.context("balance export aborted")?;
                serde_json::to_writer(&mut out, &json!({ "address": address, "coin": coin }))?;
                writeln!(out)?;
                records += 1;
            }
            tracing::info!(records, "balances exported");
            Ok(())
        }
        BalanceCommand::Fund { address, funding } => {
            let calculator = config.funding_calculator()?;
            let coin = calculator
                .fund_account(&balances, &address, &funding.to_request())
                .with_context(|| format!("failed to fund {address}"))?;
            db.flush()?;
            print_json(&json!({
                "address": address,
                "funded": coin,
                "balance": balances.balance(&address, calculator.fee_denom())?,
            }))
        }
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("ferrum {}", env!("CARGO_PKG_VERSION"));
    println!("rustc  {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
