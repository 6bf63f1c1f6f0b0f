//! # Custody Helpers
//!
//! The scaffolding shared by every contract that holds value: the
//! owner-only gate and the sweep that pays a contract's whole internal
//! balance to its owner.
//!
//! [`sweep`] enforces the ordering that keeps payouts safe:
//!
//! 1. capture the balance,
//! 2. zero it,
//! 3. invoke the external payout,
//! 4. on payout failure, restore the captured balance.
//!
//! The internal balance is therefore already zero while value is in flight,
//! and a failed payout leaves the contract exactly as it was.

use coffeelock_protocol::{Address, Amount, Call, TransferError};
use thiserror::Error;

/// The caller is not the contract owner.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("caller {caller} is not the owner {owner}")]
pub struct NotOwner {
    /// The account that attempted the call.
    pub caller: Address,
    /// The contract owner.
    pub owner: Address,
}

/// Fails unless `caller` is `owner`.
pub fn only_owner(owner: &Address, caller: &Address) -> Result<(), NotOwner> {
    if owner == caller {
        Ok(())
    } else {
        Err(NotOwner {
            caller: *caller,
            owner: *owner,
        })
    }
}

/// Pays the entire `balance` held by `custodian` to `recipient`.
///
/// Returns the amount paid. On error `balance` holds its original value
/// and nothing was transferred.
pub fn sweep(
    balance: &mut Amount,
    custodian: &Address,
    recipient: &Address,
    call: &mut Call<'_>,
) -> Result<Amount, TransferError> {
    let amount = *balance;
    *balance = 0;

    if let Err(e) = call.transfer().debit_and_pay(custodian, recipient, amount) {
        *balance = amount;
        return Err(e);
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffeelock_protocol::{EventLog, InMemoryBank, ValueTransfer};
    use chrono::Utc;

    #[test]
    fn only_owner_accepts_owner() {
        let owner = Address::derive("owner");
        assert!(only_owner(&owner, &owner).is_ok());

        let other = Address::derive("other");
        let err = only_owner(&owner, &other).unwrap_err();
        assert_eq!(err.caller, other);
        assert_eq!(err.owner, owner);
    }

    #[test]
    fn sweep_zeroes_balance_and_pays() {
        let contract = Address::derive("contract");
        let owner = Address::derive("owner");
        let mut bank = InMemoryBank::new();
        bank.mint(contract, 300).unwrap();
        let mut events = EventLog::new();
        let mut balance: Amount = 300;

        let mut call = Call::new(owner, Utc::now(), &mut bank, &mut events);
        let paid = sweep(&mut balance, &contract, &owner, &mut call).unwrap();

        assert_eq!(paid, 300);
        assert_eq!(balance, 0);
        assert_eq!(bank.balance_of(&owner), 300);
        assert_eq!(bank.balance_of(&contract), 0);
    }

    #[test]
    fn failed_sweep_restores_balance() {
        let contract = Address::derive("contract");
        let owner = Address::derive("owner");
        let mut bank = InMemoryBank::new();
        bank.mint(contract, 300).unwrap();
        bank.set_rejecting(owner, true);
        let mut events = EventLog::new();
        let mut balance: Amount = 300;

        let mut call = Call::new(owner, Utc::now(), &mut bank, &mut events);
        let err = sweep(&mut balance, &contract, &owner, &mut call).unwrap_err();

        assert_eq!(err, TransferError::Rejected(owner));
        assert_eq!(balance, 300);
        assert_eq!(bank.balance_of(&contract), 300);
    }
}
