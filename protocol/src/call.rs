//! # Call Context
//!
//! A [`Call`] bundles everything the execution environment supplies to a
//! single contract invocation: who is calling, what time it is, the
//! settlement capability, and the event log to append to.
//!
//! Contracts take `&mut Call` alongside `&mut self`. Because the call holds
//! the only mutable borrow of the settlement layer for its duration, a
//! payout cannot re-enter the contract making it.

use crate::address::Address;
use crate::clock::Timestamp;
use crate::event::{Event, EventLog};
use crate::transfer::ValueTransfer;

/// Per-invocation environment.
pub struct Call<'a> {
    caller: Address,
    now: Timestamp,
    transfer: &'a mut dyn ValueTransfer,
    events: &'a mut EventLog,
}

impl<'a> Call<'a> {
    /// Builds a call context.
    pub fn new(
        caller: Address,
        now: Timestamp,
        transfer: &'a mut dyn ValueTransfer,
        events: &'a mut EventLog,
    ) -> Self {
        Self {
            caller,
            now,
            transfer,
            events,
        }
    }

    /// The account invoking the contract.
    pub fn caller(&self) -> Address {
        self.caller
    }

    /// Current time as supplied by the environment.
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// The settlement layer.
    pub fn transfer(&mut self) -> &mut dyn ValueTransfer {
        &mut *self.transfer
    }

    /// Appends an event to the log.
    pub fn emit(&mut self, event: Event) {
        self.events.emit(event);
    }
}
