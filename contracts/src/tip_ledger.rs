//! # Tip Ledger Contract
//!
//! A "buy me a coffee" jar. Anyone can send a tip with a display name and a
//! message; every accepted tip is recorded as a [`Memo`] in an append-only
//! log, and the tipped amount accumulates in the ledger's custody until the
//! owner sweeps it.
//!
//! Unlike the vault there are no phases: the ledger is always open, its
//! balance cycles between zero and positive as tips arrive and are swept,
//! and the memo log only ever grows.

use coffeelock_protocol::{Address, Amount, Call, Event, Timestamp, TransferError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::custody::{self, NotOwner};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur during tip ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TipError {
    /// A tip of zero was offered.
    #[error("can't buy coffee for free")]
    ZeroPayment,

    /// Sweep attempted by someone other than the owner.
    #[error("only the owner can withdraw tips: {0}")]
    NotOwner(#[from] NotOwner),

    /// Sweep attempted while the ledger holds nothing.
    #[error("no tips to withdraw")]
    NothingToWithdraw,

    /// Adding the tip would overflow the ledger balance.
    #[error("amount overflow: ledger balance {balance} plus tip {tip}")]
    AmountOverflow {
        /// Ledger balance before the tip.
        balance: Amount,
        /// The offered tip.
        tip: Amount,
    },

    /// The settlement layer refused the tip or the payout.
    #[error("external transfer failed: {0}")]
    ExternalTransferFailed(#[from] TransferError),
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A record of one accepted tip. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memo {
    /// When the tip was accepted.
    pub timestamp: Timestamp,
    /// The tipper.
    pub from: Address,
    /// Display name supplied by the tipper.
    pub name: String,
    /// Free-text message supplied by the tipper.
    pub message: String,
}

impl std::fmt::Display for Memo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "At {}, {} ({}) said: \"{}\"",
            self.timestamp.timestamp(),
            self.name,
            self.from,
            self.message
        )
    }
}

/// A tip ledger instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipLedger {
    address: Address,
    owner: Address,
    memos: Vec<Memo>,
    balance: Amount,
    /// Running total of every tip ever accepted, swept or not.
    total_received: Amount,
    created_at: Timestamp,
}

impl TipLedger {
    /// Deploys an empty ledger at `address`, owned by the caller.
    pub fn create(address: Address, call: &mut Call<'_>) -> Self {
        let owner = call.caller();
        tracing::debug!(%address, %owner, "tip ledger created");
        Self {
            address,
            owner,
            memos: Vec::new(),
            balance: 0,
            total_received: 0,
            created_at: call.now(),
        }
    }

    /// Accepts a tip of `amount` from the caller and records a memo.
    ///
    /// The tip moves from the caller into the ledger's custody, the memo is
    /// appended, and a [`Event::NewMemo`] is emitted.
    ///
    /// # Errors
    ///
    /// - [`TipError::ZeroPayment`] if `amount` is zero.
    /// - [`TipError::AmountOverflow`] if the ledger balance would overflow.
    /// - [`TipError::ExternalTransferFailed`] if the caller cannot pay.
    ///
    /// On any error the ledger, the memo log, and all balances are unchanged.
    pub fn buy_coffee(
        &mut self,
        call: &mut Call<'_>,
        name: impl Into<String>,
        message: impl Into<String>,
        amount: Amount,
    ) -> Result<&Memo, TipError> {
        if amount == 0 {
            return Err(TipError::ZeroPayment);
        }

        let new_balance = self
            .balance
            .checked_add(amount)
            .ok_or(TipError::AmountOverflow {
                balance: self.balance,
                tip: amount,
            })?;
        let new_total = self.total_received.saturating_add(amount);

        let from = call.caller();
        call.transfer().credit(&from, &self.address, amount)?;

        self.balance = new_balance;
        self.total_received = new_total;

        let memo = Memo {
            timestamp: call.now(),
            from,
            name: name.into(),
            message: message.into(),
        };
        call.emit(Event::NewMemo {
            contract: self.address,
            from: memo.from,
            timestamp: memo.timestamp,
            name: memo.name.clone(),
            message: memo.message.clone(),
        });
        tracing::debug!(
            address = %self.address,
            %from,
            amount = %amount,
            memos = self.memos.len() + 1,
            "coffee bought"
        );

        self.memos.push(memo);
        Ok(&self.memos[self.memos.len() - 1])
    }

    /// Sweeps the entire ledger balance to the owner. Memos are kept.
    ///
    /// # Errors
    ///
    /// - [`TipError::NotOwner`] for any caller other than the owner.
    /// - [`TipError::NothingToWithdraw`] when the balance is zero.
    /// - [`TipError::ExternalTransferFailed`] if the owner rejects the
    ///   payout; the balance is restored.
    pub fn withdraw_tips(&mut self, call: &mut Call<'_>) -> Result<Amount, TipError> {
        custody::only_owner(&self.owner, &call.caller())?;

        if self.balance == 0 {
            return Err(TipError::NothingToWithdraw);
        }

        let amount = custody::sweep(&mut self.balance, &self.address, &self.owner, call)?;
        tracing::debug!(address = %self.address, amount = %amount, "tips withdrawn");
        Ok(amount)
    }

    /// Every accepted tip, oldest first.
    pub fn memos(&self) -> &[Memo] {
        &self.memos
    }

    /// Address the ledger was deployed at; it holds the tips.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The account that created the ledger.
    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Tips accepted but not yet swept.
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Sum of all tips ever accepted.
    pub fn total_received(&self) -> Amount {
        self.total_received
    }

    /// Deployment time.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
