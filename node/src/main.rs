// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # coffeelock Development Node
//!
//! Entry point for the `coffeelock-node` binary. Parses CLI arguments,
//! initializes logging, loads the devnet state file, runs one command
//! against it, and writes it back if the command changed anything.
//!
//! The subcommands mirror the usual contract workflow:
//!
//! - `init`: create a funded devnet
//! - `deploy-lock`, `deploy-coffee`: deploy contracts
//! - `buy-coffee`: tip a ledger
//! - `withdraw-tips`, `withdraw-lock`: pay owners
//! - `balances`, `memos`, `events`: inspect state
//! - `advance-time`: move the chain clock forward
//! - `demo`: scripted walkthrough, no state file

mod cli;
mod devnet;
mod logging;

use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use clap::Parser;

use coffeelock_protocol::config::{DEVNET_ACCOUNT_BALANCE, PROTOCOL_VERSION};
use coffeelock_protocol::{format_ether, parse_ether, Address, Event, Timestamp};

use cli::{Commands, CoffeelockCli};
use devnet::{Contract, Devnet};
use logging::LogFormat;

fn main() -> Result<()> {
    let cli = CoffeelockCli::parse();
    logging::init_logging(&cli.log_level, LogFormat::from_str_lossy(&cli.log_format))
        .context("failed to initialize logging")?;

    match cli.command {
        Commands::Init(args) => init_devnet(&cli.state, args),
        Commands::Demo => run_demo(),
        Commands::Version => {
            print_version();
            Ok(())
        }
        command => {
            let mut devnet = Devnet::load(&cli.state).with_context(|| {
                format!(
                    "failed to load devnet state from {} (run `coffeelock-node init` first)",
                    cli.state.display()
                )
            })?;

            if execute(&mut devnet, command)? {
                devnet
                    .save(&cli.state)
                    .with_context(|| format!("failed to save {}", cli.state.display()))?;
            }
            Ok(())
        }
    }
}

/// Creates a fresh state file.
fn init_devnet(state: &Path, args: cli::InitArgs) -> Result<()> {
    if state.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite it",
            state.display()
        );
    }

    let balance = parse_ether(&args.balance).context("invalid --balance")?;
    let devnet = Devnet::genesis(args.accounts, balance)?;
    devnet
        .save(state)
        .with_context(|| format!("failed to write {}", state.display()))?;

    println!("Devnet initialized.");
    println!("  State file : {}", state.display());
    println!("  Chain time : {}", devnet.now()?.timestamp());
    for (i, account) in devnet.accounts().iter().enumerate() {
        println!("  Account #{:<2} {} ({} ETH)", i, account, format_ether(balance));
    }
    Ok(())
}

/// Runs one state-changing or read-only command. Returns whether the
/// state must be written back.
fn execute(devnet: &mut Devnet, command: Commands) -> Result<bool> {
    match command {
        Commands::Balances => {
            let now = devnet.now()?;
            println!("Chain time: {}", now.timestamp());
            print_balances(devnet, devnet.accounts());
            for (address, contract) in devnet.contracts() {
                println!(
                    "{} {} balance: {}",
                    contract.kind(),
                    address,
                    format_ether(devnet.balance_of(address))
                );
                println!("  {}", describe_contract(contract, now));
            }
            println!("Total supply: {}", format_ether(devnet.total_supply()));
            Ok(false)
        }

        Commands::DeployLock(args) => {
            let from = devnet.resolve(args.from.from)?;
            let amount = parse_ether(&args.amount).context("invalid --amount")?;
            let unlock_time = devnet
                .time_after(args.unlock_in)
                .context("invalid --unlock-in")?;

            let address = devnet.deploy_lock(from, unlock_time, amount)?;
            println!(
                "Lock with {} ETH and unlock timestamp {} deployed to {}",
                format_ether(amount),
                unlock_time.timestamp(),
                address
            );
            Ok(true)
        }

        Commands::DeployCoffee(args) => {
            let from = devnet.resolve(args.from)?;
            let address = devnet.deploy_tip_ledger(from)?;
            println!("BuyMeACoffee deployed to: {}", address);
            Ok(true)
        }

        Commands::BuyCoffee(args) => {
            let from = devnet.resolve(args.from)?;
            let amount = parse_ether(&args.amount).context("invalid --amount")?;
            let memo = devnet.buy_coffee(args.contract, from, &args.name, &args.message, amount)?;
            println!("{}", memo);
            Ok(true)
        }

        Commands::WithdrawTips(args) => {
            let from = devnet.resolve(args.from.from)?;
            let ledger = devnet.tip_ledger(args.contract)?;
            let owner = ledger.owner();

            println!(
                "current balance of owner: {} ETH",
                format_ether(devnet.balance_of(&owner))
            );
            println!(
                "current balance of contract: {} ETH",
                format_ether(devnet.balance_of(&args.contract))
            );
            if ledger.balance() == 0 {
                eprintln!("no funds to withdraw!");
                return Ok(false);
            }

            devnet.withdraw_tips(args.contract, from)?;
            println!(
                "current balance of owner: {} ETH",
                format_ether(devnet.balance_of(&owner))
            );
            Ok(true)
        }

        Commands::WithdrawLock(args) => {
            let from = devnet.resolve(args.from.from)?;
            let amount = devnet.withdraw_lock(args.contract, from)?;
            let vault = devnet.lock(args.contract)?;
            println!(
                "Withdrew {} ETH from {} (unlocked at {})",
                format_ether(amount),
                args.contract,
                vault.unlock_time().timestamp()
            );
            Ok(true)
        }

        Commands::Memos(args) => {
            for memo in devnet.memos(args.contract)? {
                println!("{}", memo);
            }
            Ok(false)
        }

        Commands::Events(args) => {
            let events: Vec<&Event> = match &args.contract {
                Some(c) => devnet.events_for(c).collect(),
                None => devnet.events().entries().iter().collect(),
            };
            for event in events {
                println!("{}", describe_event(event));
            }
            Ok(false)
        }

        Commands::AdvanceTime(args) => {
            let now = match (args.secs, args.to) {
                (Some(secs), _) => devnet.advance_time(secs)?,
                (None, Some(to)) => {
                    let target = DateTime::from_timestamp(to, 0)
                        .with_context(|| format!("--to {} is not a valid timestamp", to))?;
                    devnet.increase_to(target)?;
                    devnet.now()?
                }
                (None, None) => bail!("pass --secs or --to"),
            };
            println!("Chain time: {}", now.timestamp());
            Ok(true)
        }

        Commands::RejectPayments(args) => {
            let account = devnet.resolve(args.account)?;
            devnet.set_rejecting(account, !args.off);
            println!(
                "{} now {} payouts",
                account,
                if args.off { "accepts" } else { "rejects" }
            );
            Ok(true)
        }

        Commands::Init(_) | Commands::Demo | Commands::Version => {
            bail!("command does not operate on a state file")
        }
    }
}

/// The buy-coffee walkthrough: deploy, three tips, withdraw, print memos.
fn run_demo() -> Result<()> {
    let mut devnet = Devnet::genesis(4, DEVNET_ACCOUNT_BALANCE)?;
    let [owner, tipper, tipper2, tipper3] = [0, 1, 2, 3].map(|i| devnet.accounts()[i]);

    let contract = devnet.deploy_tip_ledger(owner)?;
    println!("BuyMeACoffee deployed to: {}", contract);

    let addresses = [owner, tipper, contract];
    println!("== start ==");
    print_balances(&devnet, &addresses);

    let tip = parse_ether("1")?;
    devnet.buy_coffee(contract, tipper, "Carolina", "You're the best!", tip)?;
    devnet.buy_coffee(contract, tipper2, "Vitto", "Amazing teacher", tip)?;
    devnet.buy_coffee(contract, tipper3, "Kay", "I love my Proof of Knowledge", tip)?;

    println!("== bought coffee ==");
    print_balances(&devnet, &addresses);

    devnet.withdraw_tips(contract, owner)?;

    println!("== withdrawTips ==");
    print_balances(&devnet, &addresses);

    println!("== memos ==");
    for memo in devnet.memos(contract)? {
        println!("{}", memo);
    }
    Ok(())
}

fn print_balances(devnet: &Devnet, addresses: &[Address]) {
    for (idx, address) in addresses.iter().enumerate() {
        println!(
            "Address {} balance:  {}",
            idx,
            format_ether(devnet.balance_of(address))
        );
    }
}

fn describe_contract(contract: &Contract, now: Timestamp) -> String {
    let detail = match contract {
        Contract::Lock(vault) => format!(
            "status {}, unlock time {} ({}), deployed {}",
            vault.status(),
            vault.unlock_time().timestamp(),
            if vault.is_unlocked_at(now) { "unlocked" } else { "locked" },
            vault.created_at().timestamp()
        ),
        Contract::TipLedger(ledger) => format!(
            "{} memos, {} ETH received in total, deployed {}",
            ledger.memos().len(),
            format_ether(ledger.total_received()),
            ledger.created_at().timestamp()
        ),
    };
    format!("owner {}, {}", contract.owner(), detail)
}

fn describe_event(event: &Event) -> String {
    match event {
        Event::Withdrawal {
            contract,
            amount,
            when,
        } => format!(
            "{} Withdrawal(amount: {} ETH, when: {})",
            contract,
            format_ether(*amount),
            when.timestamp()
        ),
        Event::NewMemo {
            contract,
            from,
            timestamp,
            name,
            message,
        } => format!(
            "{} NewMemo(from: {}, timestamp: {}, name: {:?}, message: {:?})",
            contract,
            from,
            timestamp.timestamp(),
            name,
            message
        ),
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("coffeelock-node {}", env!("CARGO_PKG_VERSION"));
    println!("protocol        {}", PROTOCOL_VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffeelock_protocol::config::WEI_PER_ETHER;
    use coffeelock_protocol::ManualClock;
    use std::sync::Arc;

    #[test]
    fn execute_reports_which_commands_mutate() {
        let clock = Arc::new(ManualClock::starting_now());
        let mut devnet = Devnet::genesis(3, 10 * WEI_PER_ETHER)
            .unwrap()
            .with_clock(clock);

        let deploy = CoffeelockCli::try_parse_from(["coffeelock-node", "deploy-coffee"]).unwrap();
        assert!(execute(&mut devnet, deploy.command).unwrap());
        let contract = *devnet.contracts().keys().next().unwrap();
        assert!(matches!(
            devnet.contracts().get(&contract),
            Some(Contract::TipLedger(_))
        ));

        let balances = CoffeelockCli::try_parse_from(["coffeelock-node", "balances"]).unwrap();
        assert!(!execute(&mut devnet, balances.command).unwrap());

        // Sweeping an empty ledger is refused client-side, so nothing to save.
        let sweep = CoffeelockCli::try_parse_from([
            "coffeelock-node",
            "withdraw-tips",
            "--contract",
            &contract.to_string(),
        ])
        .unwrap();
        assert!(!execute(&mut devnet, sweep.command).unwrap());

        let tip = CoffeelockCli::try_parse_from([
            "coffeelock-node",
            "buy-coffee",
            "--contract",
            &contract.to_string(),
            "--name",
            "Vitto",
            "--message",
            "Amazing teacher",
            "--amount",
            "0.5",
        ])
        .unwrap();
        assert!(execute(&mut devnet, tip.command).unwrap());
        assert_eq!(devnet.balance_of(&contract), WEI_PER_ETHER / 2);
    }

    #[test]
    fn contract_errors_surface_through_execute() {
        let mut devnet = Devnet::genesis(2, WEI_PER_ETHER).unwrap();
        let lock = CoffeelockCli::try_parse_from([
            "coffeelock-node",
            "deploy-lock",
            "--amount",
            "2",
        ])
        .unwrap();

        let err = execute(&mut devnet, lock.command).unwrap_err();
        assert!(err.to_string().contains("insufficient funds"));
        assert!(devnet.contracts().is_empty());
    }

    #[test]
    fn huge_time_inputs_are_errors() {
        let clock = Arc::new(ManualClock::starting_now());
        let mut devnet = Devnet::genesis(2, 10 * WEI_PER_ETHER)
            .unwrap()
            .with_clock(clock);
        let before = devnet.now().unwrap();

        let lock = CoffeelockCli::try_parse_from([
            "coffeelock-node",
            "deploy-lock",
            "--unlock-in",
            "9000000000000000000",
        ])
        .unwrap();
        let err = execute(&mut devnet, lock.command).unwrap_err();
        assert!(err.to_string().contains("--unlock-in"));
        assert!(devnet.contracts().is_empty());

        let travel = CoffeelockCli::try_parse_from([
            "coffeelock-node",
            "advance-time",
            "--secs",
            "10000000000000",
        ])
        .unwrap();
        assert!(execute(&mut devnet, travel.command).is_err());
        assert_eq!(devnet.now().unwrap(), before);
    }

    #[test]
    fn contracts_are_described_with_their_state() {
        let clock = Arc::new(ManualClock::starting_now());
        let mut devnet = Devnet::genesis(2, 10 * WEI_PER_ETHER)
            .unwrap()
            .with_clock(clock);
        let owner = devnet.accounts()[0];
        let unlock = devnet.time_after(60).unwrap();
        let lock = devnet.deploy_lock(owner, unlock, WEI_PER_ETHER).unwrap();
        let now = devnet.now().unwrap();

        let line = describe_contract(&devnet.contracts()[&lock], now);
        assert!(line.contains("status Locked"));
        assert!(line.contains("(locked)"));

        let later = devnet.time_after(60).unwrap();
        let line = describe_contract(&devnet.contracts()[&lock], later);
        assert!(line.contains("(unlocked)"));
    }

    #[test]
    fn demo_runs_to_completion() {
        run_demo().unwrap();
    }

    #[test]
    fn events_are_described_with_their_contract() {
        let contract = Address::derive("ledger");
        let line = describe_event(&Event::NewMemo {
            contract,
            from: Address::derive("kay"),
            timestamp: chrono::Utc::now(),
            name: "Kay".into(),
            message: "hi".into(),
        });
        assert!(line.starts_with(&contract.to_string()));
        assert!(line.contains("NewMemo(from: 0x"));
        assert!(line.contains("message: \"hi\""));
    }
}
