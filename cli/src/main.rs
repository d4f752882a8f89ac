//! # crowdsale
//!
//! Operations binary for the crowdsale engine. Loads the platform state
//! from a JSON file, applies one operation per invocation, and writes the
//! state back. Primary output (addresses, token ids, balances) goes to
//! stdout; logs go to stderr.

mod cli;
mod config;
mod logging;
mod state;

use anyhow::{bail, Context};
use clap::Parser;
use crowdsale_engine::{Address, CrowdsaleEngine};
use tracing::info;

use crate::cli::{Commands, CrowdsaleCli};
use crate::config::LaunchConfig;
use crate::logging::LogFormat;

fn main() -> anyhow::Result<()> {
    let args = CrowdsaleCli::parse();
    logging::init_logging("info", LogFormat::from_str_lossy(&args.log_format));
    run(args)
}

fn run(args: CrowdsaleCli) -> anyhow::Result<()> {
    match args.command {
        Commands::Init(init) => {
            if args.state.exists() {
                bail!("state file {} already exists", args.state.display());
            }
            let engine = CrowdsaleEngine::new(Address::new(init.owner))?;
            state::save(&args.state, &engine)?;
            info!(custodian = %engine.custodian().address(), "platform initialized");
            println!("{}", engine.custodian().address());
        }

        Commands::DeployCollection(deploy) => {
            let mut engine = state::load(&args.state)?;
            let address = engine.deploy_collection(
                &Address::new(deploy.owner),
                &deploy.name,
                &deploy.symbol,
                &deploy.base_uri,
            )?;
            state::save(&args.state, &engine)?;
            info!(collection = %address, name = %deploy.name, "collection deployed");
            println!("{address}");
        }

        Commands::Launch(launch) => {
            let config = LaunchConfig::load(&launch.config)?;
            let caller = Address::new(launch.caller);
            let mut engine = state::load(&args.state)?;

            let sale = engine.create_sale(
                &config.project_id,
                config.unit_price,
                config.max_units,
                &config.collection,
            )?;
            info!(
                project = %config.project_id,
                sale = %sale,
                unit_price = config.unit_price,
                max_units = config.max_units,
                "sale created"
            );

            engine
                .grant_mint_rights(&caller, &config.collection, &sale)
                .context("handing mint rights to the sale")?;
            info!(collection = %config.collection, sale = %sale, "mint rights handed over");

            state::save(&args.state, &engine)?;
            println!("{sale}");
        }

        Commands::Fund(fund) => {
            let mut engine = state::load(&args.state)?;
            let account = Address::new(fund.account);
            let balance = engine.fund_account(&account, fund.amount)?;
            state::save(&args.state, &engine)?;
            info!(%account, amount = fund.amount, balance, "account funded");
            println!("{balance}");
        }

        Commands::Purchase(purchase) => {
            let mut engine = state::load(&args.state)?;
            let buyer = Address::new(purchase.buyer);
            let sale = resolve_sale(&engine, purchase.project.as_deref(), purchase.sale)?;

            let token_id = engine.purchase(&buyer, &sale, purchase.amount)?;
            state::save(&args.state, &engine)?;
            info!(%buyer, %sale, amount = purchase.amount, token_id, "unit purchased");
            println!("{token_id}");
        }

        Commands::Withdraw(withdraw) => {
            let mut engine = state::load(&args.state)?;
            let caller = Address::new(withdraw.caller);
            let recipient = Address::new(withdraw.recipient);

            let withdrawn = match withdraw.amount {
                Some(amount) => {
                    engine.withdraw_amount_to(&caller, &recipient, amount)?;
                    amount
                }
                None => engine.withdraw_to(&caller, &recipient)?,
            };
            state::save(&args.state, &engine)?;
            info!(%recipient, withdrawn, remaining = engine.custodian().balance(), "withdrawal complete");
            println!("{withdrawn}");
        }

        Commands::TransferSale(transfer) => {
            let mut engine = state::load(&args.state)?;
            let caller = Address::new(transfer.caller);
            let new_owner = Address::new(transfer.new_owner);

            engine.transfer_sale_ownership(&caller, &transfer.project, &new_owner)?;
            state::save(&args.state, &engine)?;
            info!(project = %transfer.project, %new_owner, "sale ownership transferred");
        }

        Commands::Status => {
            let engine = state::load(&args.state)?;
            print_status(&engine);
        }
    }
    Ok(())
}

/// Resolves the sale address from `--project` or `--sale`.
fn resolve_sale(
    engine: &CrowdsaleEngine,
    project: Option<&str>,
    sale: Option<String>,
) -> anyhow::Result<Address> {
    match (project, sale) {
        (Some(project), None) => {
            let address = engine.lookup_sale(project);
            if address.is_zero() {
                bail!("no sale registered for project '{project}'");
            }
            Ok(address)
        }
        (None, Some(sale)) => Ok(Address::new(sale)),
        _ => bail!("pass exactly one of --project or --sale"),
    }
}

fn print_status(engine: &CrowdsaleEngine) {
    let custodian = engine.custodian();
    println!("custodian {}", custodian.address());
    println!("  owner   {}", custodian.owner());
    println!("  balance {}", custodian.balance());

    println!("sales ({})", custodian.project_count());
    for (project_id, address) in custodian.projects() {
        if let Some(sale) = engine.sale(address) {
            let phase = if sale.is_exhausted() { "exhausted" } else { "active" };
            println!(
                "  {project_id}: {address} price={} sold={}/{} owner={} [{phase}]",
                sale.unit_price(),
                sale.units_sold(),
                sale.max_units(),
                sale.owner(),
            );
        }
    }

    println!("collections");
    for collection in engine.collections() {
        println!(
            "  {} ({}): {} minted={} owner={}",
            collection.name(),
            collection.symbol(),
            collection.address(),
            collection.total_minted(),
            collection.owner(),
        );
    }

    println!("events ({})", engine.events().len());
    for event in engine.events() {
        match serde_json::to_string(event) {
            Ok(line) => println!("  {line}"),
            Err(_) => println!("  <unserializable event>"),
        }
    }
}
