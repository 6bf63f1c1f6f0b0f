//! # CLI Interface
//!
//! Defines the command-line argument structure for `coffeelock-node` using
//! `clap` derive. Every subcommand except `demo` and `version` operates on
//! the devnet state file named by `--state`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use coffeelock_protocol::config::{DEFAULT_STATE_FILE, DEVNET_ACCOUNT_COUNT, ONE_YEAR_SECS};
use coffeelock_protocol::Address;

use crate::devnet::AccountRef;

/// coffeelock local development chain.
///
/// Hosts time-locked vaults and tip ledgers on an in-process settlement
/// layer whose state persists between invocations.
#[derive(Parser, Debug)]
#[command(
    name = "coffeelock-node",
    about = "coffeelock local development chain",
    version,
    propagate_version = true
)]
pub struct CoffeelockCli {
    /// Path to the devnet state file.
    #[arg(long, short = 's', global = true, env = "COFFEELOCK_STATE", default_value = DEFAULT_STATE_FILE)]
    pub state: PathBuf,

    /// Log output format: `pretty` or `json`.
    #[arg(long, global = true, env = "COFFEELOCK_LOG_FORMAT", default_value = "pretty")]
    pub log_format: String,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, global = true, default_value = "coffeelock_node=info,coffeelock_contracts=info")]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a fresh devnet with funded accounts.
    Init(InitArgs),
    /// Print account and contract balances.
    Balances,
    /// Deploy a time-locked vault.
    DeployLock(DeployLockArgs),
    /// Deploy a tip ledger.
    DeployCoffee(FromArgs),
    /// Send a tip with a name and message.
    BuyCoffee(BuyCoffeeArgs),
    /// Sweep a tip ledger's balance to its owner.
    WithdrawTips(ContractCallArgs),
    /// Withdraw a vault's deposit after its unlock time.
    WithdrawLock(ContractCallArgs),
    /// Print the memo log of a tip ledger.
    Memos(ContractArgs),
    /// Print emitted events.
    Events(EventsArgs),
    /// Move chain time forward.
    AdvanceTime(AdvanceTimeArgs),
    /// Make an account refuse (or accept again) incoming payouts.
    RejectPayments(RejectPaymentsArgs),
    /// Run the buy-coffee walkthrough on a throwaway in-memory chain.
    Demo,
    /// Print version information and exit.
    Version,
}

/// Arguments for the `init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Number of funded accounts to create.
    #[arg(long, default_value_t = DEVNET_ACCOUNT_COUNT)]
    pub accounts: usize,

    /// Starting balance of each account, in ether.
    #[arg(long, default_value = "10000")]
    pub balance: String,

    /// Overwrite an existing state file.
    #[arg(long)]
    pub force: bool,
}

/// The sending account of a transaction.
#[derive(Parser, Debug)]
pub struct FromArgs {
    /// Sender: a genesis account index or a 0x address.
    #[arg(long, short = 'f', default_value = "0")]
    pub from: AccountRef,
}

/// Arguments for the `deploy-lock` subcommand.
#[derive(Parser, Debug)]
pub struct DeployLockArgs {
    #[command(flatten)]
    pub from: FromArgs,

    /// Seconds from now until the vault unlocks.
    #[arg(long, default_value_t = ONE_YEAR_SECS as u64)]
    pub unlock_in: u64,

    /// Amount to lock, in ether.
    #[arg(long, default_value = "0.000000001")]
    pub amount: String,
}

/// Arguments for the `buy-coffee` subcommand.
#[derive(Parser, Debug)]
pub struct BuyCoffeeArgs {
    /// Address of the tip ledger.
    #[arg(long, short = 'c')]
    pub contract: Address,

    /// Tipper: a genesis account index or a 0x address.
    #[arg(long, short = 'f', default_value = "1")]
    pub from: AccountRef,

    /// Display name of the tipper.
    #[arg(long)]
    pub name: String,

    /// Message to leave with the tip.
    #[arg(long)]
    pub message: String,

    /// Tip amount, in ether.
    #[arg(long, default_value = "1")]
    pub amount: String,
}

/// A contract plus the account calling it.
#[derive(Parser, Debug)]
pub struct ContractCallArgs {
    /// Address of the contract.
    #[arg(long, short = 'c')]
    pub contract: Address,

    #[command(flatten)]
    pub from: FromArgs,
}

/// A contract to inspect.
#[derive(Parser, Debug)]
pub struct ContractArgs {
    /// Address of the contract.
    #[arg(long, short = 'c')]
    pub contract: Address,
}

/// Arguments for the `events` subcommand.
#[derive(Parser, Debug)]
pub struct EventsArgs {
    /// Only show events emitted by this contract.
    #[arg(long, short = 'c')]
    pub contract: Option<Address>,
}

/// Arguments for the `advance-time` subcommand.
#[derive(Parser, Debug)]
pub struct AdvanceTimeArgs {
    /// Seconds to move forward.
    #[arg(long, conflicts_with = "to", required_unless_present = "to")]
    pub secs: Option<u64>,

    /// Unix timestamp to move forward to.
    #[arg(long)]
    pub to: Option<i64>,
}

/// Arguments for the `reject-payments` subcommand.
#[derive(Parser, Debug)]
pub struct RejectPaymentsArgs {
    /// Account to change: a genesis account index or a 0x address.
    #[arg(long)]
    pub account: AccountRef,

    /// Accept payouts again instead of rejecting them.
    #[arg(long)]
    pub off: bool,
}
