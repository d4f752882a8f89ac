//! # CLI Interface
//!
//! Defines the command-line argument structure for the `crowdsale` binary
//! using `clap` derive. One subcommand per operational step: initialize
//! the platform state, deploy a collection, launch a project's sale, and
//! drive purchases, withdrawals, and ownership transfers against it.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Crowdsale platform operations tool.
///
/// All state lives in a single JSON file; every command loads it, applies
/// one operation, and writes it back.
#[derive(Parser, Debug)]
#[command(
    name = "crowdsale",
    about = "Operations CLI for the crowdsale engine",
    version,
    propagate_version = true
)]
pub struct CrowdsaleCli {
    /// Path to the platform state file.
    #[arg(
        long,
        short = 's',
        env = "CROWDSALE_STATE",
        default_value = "crowdsale-state.json",
        global = true
    )]
    pub state: PathBuf,

    /// Log output format: "pretty" or "json".
    #[arg(long, env = "CROWDSALE_LOG_FORMAT", default_value = "pretty", global = true)]
    pub log_format: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the crowdsale binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a fresh platform state file with a new custodian.
    Init(InitArgs),
    /// Deploy an NFT collection.
    DeployCollection(DeployCollectionArgs),
    /// Create a project's sale from a launch config and hand it the
    /// collection's mint rights.
    Launch(LaunchArgs),
    /// Credit an account from the faucet.
    Fund(FundArgs),
    /// Buy one unit from a sale.
    Purchase(PurchaseArgs),
    /// Withdraw pooled funds from the custodian.
    Withdraw(WithdrawArgs),
    /// Reassign a registered sale's owner.
    TransferSale(TransferSaleArgs),
    /// Print custodian, sales, collections, and the event log.
    Status,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Identity that owns the custodian (may withdraw and move sales).
    #[arg(long)]
    pub owner: String,
}

/// Arguments for the `deploy-collection` subcommand.
#[derive(Parser, Debug)]
pub struct DeployCollectionArgs {
    /// Identity that owns the collection until mint rights are handed over.
    #[arg(long)]
    pub owner: String,

    /// Human-readable collection name.
    #[arg(long)]
    pub name: String,

    /// Ticker symbol.
    #[arg(long)]
    pub symbol: String,

    /// Base URI; token URIs default to this plus the token id.
    #[arg(long, default_value = "")]
    pub base_uri: String,
}

/// Arguments for the `launch` subcommand.
#[derive(Parser, Debug)]
pub struct LaunchArgs {
    /// Path to the launch configuration file (JSON).
    #[arg(long, short = 'c', default_value = "deployment.json")]
    pub config: PathBuf,

    /// Calling identity — must own the collection to hand over mint rights.
    #[arg(long = "as")]
    pub caller: String,
}

/// Arguments for the `fund` subcommand.
#[derive(Parser, Debug)]
pub struct FundArgs {
    /// Account to credit.
    #[arg(long)]
    pub account: String,

    /// Amount in base units.
    #[arg(long)]
    pub amount: u64,
}

/// Arguments for the `purchase` subcommand.
#[derive(Parser, Debug)]
pub struct PurchaseArgs {
    /// Purchasing identity; pays and receives the minted asset.
    #[arg(long = "as")]
    pub buyer: String,

    /// Project identifier to buy from (resolved through the registry).
    #[arg(long, conflicts_with = "sale")]
    pub project: Option<String>,

    /// Sale address to buy from directly.
    #[arg(long)]
    pub sale: Option<String>,

    /// Attached value in base units; must cover the unit price.
    #[arg(long)]
    pub amount: u64,
}

/// Arguments for the `withdraw` subcommand.
#[derive(Parser, Debug)]
pub struct WithdrawArgs {
    /// Calling identity — must be the custodian owner.
    #[arg(long = "as")]
    pub caller: String,

    /// Account the funds go to.
    #[arg(long)]
    pub recipient: String,

    /// Amount in base units; omit to drain the full balance.
    #[arg(long)]
    pub amount: Option<u64>,
}

/// Arguments for the `transfer-sale` subcommand.
#[derive(Parser, Debug)]
pub struct TransferSaleArgs {
    /// Calling identity — must be the custodian owner.
    #[arg(long = "as")]
    pub caller: String,

    /// Project identifier of the sale to reassign.
    #[arg(long)]
    pub project: String,

    /// The sale's new owner.
    #[arg(long)]
    pub new_owner: String,
}
