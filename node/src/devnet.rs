//! # Local Development Chain
//!
//! A [`Devnet`] is a single-process stand-in for the settlement network:
//! it owns the [`InMemoryBank`], the [`EventLog`], every deployed contract,
//! and a clock that can be pushed forward for testing time locks. Each
//! method is one serialized transaction: it either commits or returns an
//! error with nothing changed.
//!
//! The whole chain serializes to a JSON state file so that separate CLI
//! invocations (`deploy-coffee`, then `buy-coffee`, then `withdraw-tips`)
//! see each other's effects.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use coffeelock_contracts::{LockError, Memo, TimeLockVault, TipError, TipLedger};
use coffeelock_protocol::config::devnet_account_seed;
use coffeelock_protocol::{
    Address, AddressError, Amount, Call, Clock, ClockError, Event, EventLog, InMemoryBank,
    SystemClock, Timestamp, TransferError, ValueTransfer,
};
use coffeelock_protocol::shift_secs;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors surfaced by devnet transactions and state persistence.
#[derive(Debug, Error)]
pub enum DevnetError {
    /// No contract lives at the address.
    #[error("no contract deployed at {0}")]
    UnknownContract(Address),

    /// The contract at the address is of another kind.
    #[error("contract at {address} is a {actual}, not a {expected}")]
    WrongContractKind {
        /// Address that was looked up.
        address: Address,
        /// Kind the caller asked for.
        expected: &'static str,
        /// Kind actually deployed there.
        actual: &'static str,
    },

    /// An account index beyond the genesis accounts.
    #[error("no devnet account with index {index} (have {count})")]
    UnknownAccount {
        /// Requested index.
        index: usize,
        /// Number of genesis accounts.
        count: usize,
    },

    /// A time-locked vault call failed.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// A tip ledger call failed.
    #[error(transparent)]
    Tip(#[from] TipError),

    /// A raw settlement operation failed.
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// Time travel into the past.
    #[error(transparent)]
    Clock(#[from] ClockError),

    /// Reading or writing the state file failed.
    #[error("state file {path}: {source}")]
    Io {
        /// The state file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The state file is not valid devnet JSON.
    #[error("corrupt state file {path}: {source}")]
    Corrupt {
        /// The state file.
        path: PathBuf,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A contract deployed on the devnet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Contract {
    /// A `Lock` deployment.
    Lock(TimeLockVault),
    /// A `BuyMeACoffee` deployment.
    TipLedger(TipLedger),
}

impl Contract {
    /// The contract kind as shown to users.
    pub fn kind(&self) -> &'static str {
        match self {
            Contract::Lock(_) => "Lock",
            Contract::TipLedger(_) => "BuyMeACoffee",
        }
    }

    /// The contract's owner.
    pub fn owner(&self) -> Address {
        match self {
            Contract::Lock(v) => v.owner(),
            Contract::TipLedger(l) => l.owner(),
        }
    }
}

/// How a CLI user names an account: a genesis index or a full address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRef {
    /// The n-th genesis account.
    Index(usize),
    /// Any address.
    Address(Address),
}

impl FromStr for AccountRef {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<usize>() {
            Ok(index) => Ok(AccountRef::Index(index)),
            Err(_) => s.parse().map(AccountRef::Address),
        }
    }
}

fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}

/// The whole local chain.
#[derive(Serialize, Deserialize)]
pub struct Devnet {
    accounts: Vec<Address>,
    bank: InMemoryBank,
    events: EventLog,
    contracts: BTreeMap<Address, Contract>,
    nonces: BTreeMap<Address, u64>,
    /// Seconds added to the underlying clock by time-travel commands.
    #[serde(default)]
    time_offset_secs: i64,
    #[serde(skip, default = "system_clock")]
    clock: Arc<dyn Clock>,
}

impl Devnet {
    /// Creates a chain with `account_count` accounts holding `balance` each.
    pub fn genesis(account_count: usize, balance: Amount) -> Result<Self, DevnetError> {
        let mut bank = InMemoryBank::new();
        let accounts: Vec<Address> = (0..account_count)
            .map(|i| Address::derive(&devnet_account_seed(i)))
            .collect();
        for account in &accounts {
            bank.mint(*account, balance)?;
        }

        tracing::info!(accounts = account_count, "devnet genesis created");
        Ok(Self {
            accounts,
            bank,
            events: EventLog::new(),
            contracts: BTreeMap::new(),
            nonces: BTreeMap::new(),
            time_offset_secs: 0,
            clock: system_clock(),
        })
    }

    /// Replaces the underlying clock.
    #[cfg(test)]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Loads a chain from its JSON state file.
    pub fn load(path: &Path) -> Result<Self, DevnetError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DevnetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let devnet: Devnet = serde_json::from_str(&raw).map_err(|source| DevnetError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), contracts = devnet.contracts.len(), "state loaded");
        Ok(devnet)
    }

    /// Writes the chain to its JSON state file, replacing it atomically.
    pub fn save(&self, path: &Path) -> Result<(), DevnetError> {
        let io_err = |source: std::io::Error| DevnetError::Io {
            path: path.to_path_buf(),
            source,
        };
        let json = serde_json::to_string_pretty(self).map_err(|source| DevnetError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)?;
        tracing::debug!(path = %path.display(), "state saved");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Time
    // -----------------------------------------------------------------------

    /// Current chain time.
    pub fn now(&self) -> Result<Timestamp, DevnetError> {
        Ok(shift_secs(self.clock.now(), self.time_offset_secs.into())?)
    }

    /// Chain time `secs` seconds from now.
    pub fn time_after(&self, secs: u64) -> Result<Timestamp, DevnetError> {
        Ok(shift_secs(self.now()?, secs.into())?)
    }

    /// Moves chain time forward by `secs`. The chain is untouched on error.
    pub fn advance_time(&mut self, secs: u64) -> Result<Timestamp, DevnetError> {
        let now = self.time_after(secs)?;
        self.set_time(now);
        tracing::info!(%now, "chain time advanced");
        Ok(now)
    }

    /// Moves chain time forward to exactly `target`.
    pub fn increase_to(&mut self, target: Timestamp) -> Result<(), DevnetError> {
        let current = self.now()?;
        if target < current {
            return Err(ClockError::Backwards {
                current,
                requested: target,
            }
            .into());
        }
        self.set_time(target);
        tracing::info!(now = %target, "chain time advanced");
        Ok(())
    }

    fn set_time(&mut self, target: Timestamp) {
        self.time_offset_secs = (target - self.clock.now()).num_seconds();
    }

    // -----------------------------------------------------------------------
    // Accounts
    // -----------------------------------------------------------------------

    /// Genesis accounts in index order.
    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// Resolves an [`AccountRef`] to an address.
    pub fn resolve(&self, account: AccountRef) -> Result<Address, DevnetError> {
        match account {
            AccountRef::Address(a) => Ok(a),
            AccountRef::Index(index) => {
                self.accounts
                    .get(index)
                    .copied()
                    .ok_or(DevnetError::UnknownAccount {
                        index,
                        count: self.accounts.len(),
                    })
            }
        }
    }

    /// Settlement balance of any account or contract.
    pub fn balance_of(&self, account: &Address) -> Amount {
        self.bank.balance_of(account)
    }

    /// Sum of every balance on the chain.
    pub fn total_supply(&self) -> Amount {
        self.bank.total_supply()
    }

    /// Makes payouts to `account` fail, or succeed again.
    pub fn set_rejecting(&mut self, account: Address, rejecting: bool) {
        self.bank.set_rejecting(account, rejecting);
        tracing::info!(%account, rejecting, "payment acceptance changed");
    }

    // -----------------------------------------------------------------------
    // Contracts
    // -----------------------------------------------------------------------

    /// All deployed contracts by address.
    pub fn contracts(&self) -> &BTreeMap<Address, Contract> {
        &self.contracts
    }

    /// Every event emitted on this chain.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Events emitted by one contract.
    pub fn events_for<'a>(&'a self, contract: &'a Address) -> impl Iterator<Item = &'a Event> {
        self.events.for_contract(contract)
    }

    /// Deploys a `Lock` from `from`, locking `amount` until `unlock_time`.
    pub fn deploy_lock(
        &mut self,
        from: Address,
        unlock_time: Timestamp,
        amount: Amount,
    ) -> Result<Address, DevnetError> {
        let address = self.next_contract_address(&from);
        let now = self.now()?;
        let mut call = Call::new(from, now, &mut self.bank, &mut self.events);
        let vault = TimeLockVault::create(address, unlock_time, amount, &mut call)
            .map_err(|e| {
                tracing::warn!(%from, error = %e, "lock deployment rejected");
                e
            })?;

        self.commit_deployment(from, address, Contract::Lock(vault));
        Ok(address)
    }

    /// Deploys a `BuyMeACoffee` tip ledger owned by `from`.
    pub fn deploy_tip_ledger(&mut self, from: Address) -> Result<Address, DevnetError> {
        let address = self.next_contract_address(&from);
        let now = self.now()?;
        let mut call = Call::new(from, now, &mut self.bank, &mut self.events);
        let ledger = TipLedger::create(address, &mut call);

        self.commit_deployment(from, address, Contract::TipLedger(ledger));
        Ok(address)
    }

    /// Sends a tip to the ledger at `contract`.
    pub fn buy_coffee(
        &mut self,
        contract: Address,
        from: Address,
        name: &str,
        message: &str,
        amount: Amount,
    ) -> Result<Memo, DevnetError> {
        let now = self.now()?;
        let ledger = tip_ledger_mut(&mut self.contracts, contract)?;
        let mut call = Call::new(from, now, &mut self.bank, &mut self.events);
        let memo = ledger
            .buy_coffee(&mut call, name, message, amount)
            .map_err(|e| {
                tracing::warn!(%contract, %from, error = %e, "tip rejected");
                e
            })?
            .clone();
        Ok(memo)
    }

    /// Sweeps the ledger at `contract` to its owner.
    pub fn withdraw_tips(&mut self, contract: Address, from: Address) -> Result<Amount, DevnetError> {
        let now = self.now()?;
        let ledger = tip_ledger_mut(&mut self.contracts, contract)?;
        let mut call = Call::new(from, now, &mut self.bank, &mut self.events);
        let amount = ledger
            .withdraw_tips(&mut call)
            .map_err(|e| {
                tracing::warn!(%contract, %from, error = %e, "withdrawTips rejected");
                e
            })?;
        Ok(amount)
    }

    /// Withdraws the deposit of the lock at `contract`.
    pub fn withdraw_lock(&mut self, contract: Address, from: Address) -> Result<Amount, DevnetError> {
        let now = self.now()?;
        let vault = match self.contracts.get_mut(&contract) {
            Some(Contract::Lock(v)) => v,
            Some(other) => {
                return Err(DevnetError::WrongContractKind {
                    address: contract,
                    expected: "Lock",
                    actual: other.kind(),
                })
            }
            None => return Err(DevnetError::UnknownContract(contract)),
        };
        let mut call = Call::new(from, now, &mut self.bank, &mut self.events);
        let amount = vault
            .withdraw(&mut call)
            .map_err(|e| {
                tracing::warn!(%contract, %from, error = %e, "withdraw rejected");
                e
            })?;
        Ok(amount)
    }

    /// The lock deployed at `contract`.
    pub fn lock(&self, contract: Address) -> Result<&TimeLockVault, DevnetError> {
        match self.contracts.get(&contract) {
            Some(Contract::Lock(v)) => Ok(v),
            Some(other) => Err(DevnetError::WrongContractKind {
                address: contract,
                expected: "Lock",
                actual: other.kind(),
            }),
            None => Err(DevnetError::UnknownContract(contract)),
        }
    }

    /// The tip ledger deployed at `contract`.
    pub fn tip_ledger(&self, contract: Address) -> Result<&TipLedger, DevnetError> {
        match self.contracts.get(&contract) {
            Some(Contract::TipLedger(l)) => Ok(l),
            Some(other) => Err(DevnetError::WrongContractKind {
                address: contract,
                expected: "BuyMeACoffee",
                actual: other.kind(),
            }),
            None => Err(DevnetError::UnknownContract(contract)),
        }
    }

    /// Memo log of the tip ledger at `contract`.
    pub fn memos(&self, contract: Address) -> Result<&[Memo], DevnetError> {
        Ok(self.tip_ledger(contract)?.memos())
    }

    fn next_contract_address(&self, deployer: &Address) -> Address {
        let nonce = self.nonces.get(deployer).copied().unwrap_or(0);
        Address::for_contract(deployer, nonce)
    }

    fn commit_deployment(&mut self, deployer: Address, address: Address, contract: Contract) {
        tracing::info!(%deployer, %address, kind = contract.kind(), "contract deployed");
        *self.nonces.entry(deployer).or_insert(0) += 1;
        self.contracts.insert(address, contract);
    }
}

fn tip_ledger_mut(
    contracts: &mut BTreeMap<Address, Contract>,
    contract: Address,
) -> Result<&mut TipLedger, DevnetError> {
    match contracts.get_mut(&contract) {
        Some(Contract::TipLedger(l)) => Ok(l),
        Some(other) => Err(DevnetError::WrongContractKind {
            address: contract,
            expected: "BuyMeACoffee",
            actual: other.kind(),
        }),
        None => Err(DevnetError::UnknownContract(contract)),
    }
}
