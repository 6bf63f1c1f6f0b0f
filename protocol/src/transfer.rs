//! # Value Transfer Primitive
//!
//! The only way contracts touch money. A [`ValueTransfer`] implementation is
//! the settlement layer as seen from inside a contract call: it moves value
//! into a contract's custody and pays value out of it.
//!
//! Both operations are all-or-nothing. If an implementation returns `Err`,
//! no balance anywhere has changed.

use thiserror::Error;

use crate::address::Address;
use crate::units::Amount;

/// Errors reported by the settlement layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    /// The paying account does not hold enough value.
    #[error("insufficient funds in {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Account being debited.
        account: Address,
        /// Its balance at the time of the call.
        available: Amount,
        /// Amount that was requested.
        requested: Amount,
    },

    /// The receiving account refused the payment.
    #[error("recipient {0} rejected the transfer")]
    Rejected(Address),

    /// Crediting the receiver would overflow its balance.
    #[error("balance overflow crediting {0}")]
    Overflow(Address),
}

/// Atomic movement of value between accounts.
pub trait ValueTransfer {
    /// Moves `amount` from `payer` into the custody of `custodian`.
    ///
    /// This is the value attached to a call: a deployment deposit or a tip.
    fn credit(
        &mut self,
        payer: &Address,
        custodian: &Address,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// Debits `amount` from `custodian` and pays it to `recipient`.
    ///
    /// Fails without effect if the custodian is short or the recipient
    /// rejects the payment.
    fn debit_and_pay(
        &mut self,
        custodian: &Address,
        recipient: &Address,
        amount: Amount,
    ) -> Result<(), TransferError>;

    /// Current balance held by `account`.
    fn balance_of(&self, account: &Address) -> Amount;
}
