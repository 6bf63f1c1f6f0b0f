//! # Time-Locked Vault Contract
//!
//! Holds a single deposit until a deadline, then releases it to the owner
//! exactly once. The lifecycle is:
//!
//! 1. **Create**: the creator picks an unlock time strictly in the future
//!    and deposits the funds. The creator becomes the owner.
//! 2. **Locked**: every withdrawal attempt before the unlock time fails,
//!    no matter who makes it.
//! 3. **Withdraw**: once the unlock time has arrived, the owner (and only
//!    the owner) can withdraw the full balance.
//! 4. **Withdrawn**: terminal. The vault is inert.

use coffeelock_protocol::{Address, Amount, Call, Event, Timestamp, TransferError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::custody::{self, NotOwner};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during vault operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LockError {
    /// The unlock time is not in the future.
    #[error("unlock time should be in the future: {unlock_time} is not after {now}")]
    InvalidSchedule {
        /// Requested unlock time.
        unlock_time: Timestamp,
        /// Time of the deployment attempt.
        now: Timestamp,
    },

    /// Withdrawal attempted before the unlock time.
    #[error("you can't withdraw yet: unlocks at {unlock_time}, now {now}")]
    TooEarly {
        /// When the vault unlocks.
        unlock_time: Timestamp,
        /// Time of the attempt.
        now: Timestamp,
    },

    /// Withdrawal attempted by someone other than the owner.
    #[error("you aren't the owner: {0}")]
    NotOwner(#[from] NotOwner),

    /// The vault holds nothing (already withdrawn, or created empty).
    #[error("nothing to withdraw")]
    NothingToWithdraw,

    /// The settlement layer refused the deposit or the payout.
    #[error("external transfer failed: {0}")]
    ExternalTransferFailed(#[from] TransferError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Lifecycle state of a vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultStatus {
    /// Deposit held, not yet withdrawn.
    Locked,
    /// Deposit paid out to the owner. Terminal.
    Withdrawn,
}

impl std::fmt::Display for VaultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VaultStatus::Locked => write!(f, "Locked"),
            VaultStatus::Withdrawn => write!(f, "Withdrawn"),
        }
    }
}

/// A time-locked vault instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLockVault {
    address: Address,
    owner: Address,
    unlock_time: Timestamp,
    balance: Amount,
    status: VaultStatus,
    created_at: Timestamp,
}

impl TimeLockVault {
    /// Deploys a vault at `address`, locking `deposit` from the caller
    /// until `unlock_time`.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::InvalidSchedule`] if `unlock_time` is not
    /// strictly after the call's current time, and
    /// [`LockError::ExternalTransferFailed`] if the caller cannot fund the
    /// deposit. Neither case moves any value.
    pub fn create(
        address: Address,
        unlock_time: Timestamp,
        deposit: Amount,
        call: &mut Call<'_>,
    ) -> Result<Self, LockError> {
        let now = call.now();
        if unlock_time <= now {
            return Err(LockError::InvalidSchedule { unlock_time, now });
        }

        let owner = call.caller();
        call.transfer().credit(&owner, &address, deposit)?;

        tracing::debug!(%address, %owner, %unlock_time, deposit = %deposit, "vault created");

        Ok(Self {
            address,
            owner,
            unlock_time,
            balance: deposit,
            status: VaultStatus::Locked,
            created_at: now,
        })
    }

    /// Pays the whole deposit to the owner.
    ///
    /// Checks run in this order: unlock time, ownership, balance. On
    /// success a [`Event::Withdrawal`] is emitted and the paid amount is
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`LockError::TooEarly`] before the unlock time, for any caller.
    /// - [`LockError::NotOwner`] for any caller other than the owner.
    /// - [`LockError::NothingToWithdraw`] once the deposit has been paid.
    /// - [`LockError::ExternalTransferFailed`] if the owner rejects the
    ///   payout; the balance is restored and no event is emitted.
    pub fn withdraw(&mut self, call: &mut Call<'_>) -> Result<Amount, LockError> {
        let now = call.now();
        if now < self.unlock_time {
            return Err(LockError::TooEarly {
                unlock_time: self.unlock_time,
                now,
            });
        }

        custody::only_owner(&self.owner, &call.caller())?;

        if self.status == VaultStatus::Withdrawn || self.balance == 0 {
            return Err(LockError::NothingToWithdraw);
        }

        let amount = custody::sweep(&mut self.balance, &self.address, &self.owner, call)?;
        self.status = VaultStatus::Withdrawn;

        call.emit(Event::Withdrawal {
            contract: self.address,
            amount,
            when: now,
        });
        tracing::debug!(address = %self.address, amount = %amount, "vault withdrawn");

        Ok(amount)
    }

    /// Address the vault was deployed at; it holds the deposit.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The account that created the vault.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// When withdrawals become possible.
    pub fn unlock_time(&self) -> Timestamp {
        self.unlock_time
    }

    /// Amount still locked.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Current lifecycle state.
    pub fn status(&self) -> VaultStatus {
        self.status
    }

    /// Deployment time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Whether `now` is at or past the unlock time.
    pub fn is_unlocked_at(&self, now: Timestamp) -> bool {
        now >= self.unlock_time
    }
}
