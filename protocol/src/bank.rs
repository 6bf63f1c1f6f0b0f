//! # In-Memory Settlement
//!
//! [`InMemoryBank`] is the reference [`ValueTransfer`] implementation: a
//! map from [`Address`] to balance with checked arithmetic on every
//! movement. The devnet persists it as part of its state file, and every
//! contract test runs against it.
//!
//! Accounts can be flagged as *rejecting*, which makes every payout to them
//! fail with [`TransferError::Rejected`]. This models a receiver whose
//! fallback reverts, and is how the rollback paths of the contracts get
//! exercised.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::transfer::{TransferError, ValueTransfer};
use crate::units::Amount;

/// Balances of every known account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryBank {
    balances: BTreeMap<Address, Amount>,
    #[serde(default)]
    rejecting: BTreeSet<Address>,
}

impl InMemoryBank {
    /// Creates an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mints `amount` into `account` out of thin air. Genesis and tests only.
    pub fn mint(&mut self, account: Address, amount: Amount) -> Result<Amount, TransferError> {
        let balance = self.balances.entry(account).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or(TransferError::Overflow(account))?;
        Ok(*balance)
    }

    /// Makes payouts to `account` fail (or succeed again).
    pub fn set_rejecting(&mut self, account: Address, rejecting: bool) {
        if rejecting {
            self.rejecting.insert(account);
        } else {
            self.rejecting.remove(&account);
        }
    }

    /// Whether payouts to `account` are currently refused.
    pub fn is_rejecting(&self, account: &Address) -> bool {
        self.rejecting.contains(account)
    }

    /// All accounts with a balance entry, in address order.
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Amount)> {
        self.balances.iter()
    }

    /// Sum of all balances, saturating at [`Amount::MAX`]. Transfers never
    /// change it.
    pub fn total_supply(&self) -> Amount {
        self.balances
            .values()
            .fold(0, |total, balance| total.saturating_add(*balance))
    }

    fn move_value(
        &mut self,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                account: *from,
                available,
                requested: amount,
            });
        }
        if from == to {
            return Ok(());
        }

        let new_to = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(TransferError::Overflow(*to))?;

        // Both sides validated; nothing below can fail.
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, new_to);
        Ok(())
    }
}

impl ValueTransfer for InMemoryBank {
    fn credit(
        &mut self,
        payer: &Address,
        custodian: &Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        self.move_value(payer, custodian, amount)?;
        tracing::trace!(%payer, %custodian, amount = %amount, "credited into custody");
        Ok(())
    }

    fn debit_and_pay(
        &mut self,
        custodian: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        if self.is_rejecting(recipient) {
            return Err(TransferError::Rejected(*recipient));
        }
        self.move_value(custodian, recipient, amount)?;
        tracing::trace!(%custodian, %recipient, amount = %amount, "paid out of custody");
        Ok(())
    }

    fn balance_of(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded(owner: Address, amount: Amount) -> InMemoryBank {
        let mut bank = InMemoryBank::new();
        bank.mint(owner, amount).unwrap();
        bank
    }

    #[test]
    fn credit_moves_value_into_custody() {
        let alice = Address::derive("alice");
        let contract = Address::derive("contract");
        let mut bank = funded(alice, 1_000);

        bank.credit(&alice, &contract, 400).unwrap();

        assert_eq!(bank.balance_of(&alice), 600);
        assert_eq!(bank.balance_of(&contract), 400);
        assert_eq!(bank.total_supply(), 1_000);
    }

    #[test]
    fn credit_with_insufficient_funds_changes_nothing() {
        let alice = Address::derive("alice");
        let contract = Address::derive("contract");
        let mut bank = funded(alice, 100);

        let err = bank.credit(&alice, &contract, 101).unwrap_err();
        assert_eq!(
            err,
            TransferError::InsufficientFunds {
                account: alice,
                available: 100,
                requested: 101,
            }
        );
        assert_eq!(bank.balance_of(&alice), 100);
        assert_eq!(bank.balance_of(&contract), 0);
    }

    #[test]
    fn rejecting_recipient_blocks_payout() {
        let contract = Address::derive("contract");
        let owner = Address::derive("owner");
        let mut bank = funded(contract, 500);
        bank.set_rejecting(owner, true);

        let err = bank.debit_and_pay(&contract, &owner, 500).unwrap_err();
        assert_eq!(err, TransferError::Rejected(owner));
        assert_eq!(bank.balance_of(&contract), 500);
        assert_eq!(bank.balance_of(&owner), 0);

        bank.set_rejecting(owner, false);
        bank.debit_and_pay(&contract, &owner, 500).unwrap();
        assert_eq!(bank.balance_of(&owner), 500);
    }

    #[test]
    fn overflowing_recipient_is_refused() {
        let rich = Address::derive("rich");
        let payer = Address::derive("payer");
        let mut bank = funded(rich, Amount::MAX);
        bank.mint(payer, 1).unwrap();

        let err = bank.credit(&payer, &rich, 1).unwrap_err();
        assert_eq!(err, TransferError::Overflow(rich));
        assert_eq!(bank.balance_of(&payer), 1);
    }

    #[test]
    fn mint_overflow_rejected() {
        let acct = Address::derive("acct");
        let mut bank = funded(acct, Amount::MAX);
        assert!(matches!(
            bank.mint(acct, 1),
            Err(TransferError::Overflow(_))
        ));
    }

    #[test]
    fn bank_serialization_roundtrip() {
        let alice = Address::derive("alice");
        let bob = Address::derive("bob");
        let mut bank = funded(alice, 42);
        bank.set_rejecting(bob, true);

        let json = serde_json::to_string(&bank).expect("serialize");
        let restored: InMemoryBank = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored.balance_of(&alice), 42);
        assert!(restored.is_rejecting(&bob));
    }
}
