//! # Contract Events
//!
//! Events are the observable side channel of a contract call. Instead of a
//! global broadcast, every call appends to an explicit [`EventLog`] handed
//! to it through [`crate::call::Call`]. The log is append-only: there is no
//! API to remove or rewrite an entry.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::clock::Timestamp;
use crate::units::Amount;

/// Something a contract announced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A time-locked vault paid out its deposit.
    Withdrawal {
        /// The vault that emitted the event.
        contract: Address,
        /// Amount paid to the owner.
        amount: Amount,
        /// Time of the withdrawal.
        when: Timestamp,
    },

    /// A tip ledger accepted a tip.
    NewMemo {
        /// The ledger that emitted the event.
        contract: Address,
        /// The tipper.
        from: Address,
        /// Time the tip was accepted.
        timestamp: Timestamp,
        /// Display name supplied by the tipper.
        name: String,
        /// Message supplied by the tipper.
        message: String,
    },
}

impl Event {
    /// The contract that emitted this event.
    pub fn contract(&self) -> &Address {
        match self {
            Event::Withdrawal { contract, .. } | Event::NewMemo { contract, .. } => contract,
        }
    }

    /// The event's name as it appears in logs and the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Withdrawal { .. } => "Withdrawal",
            Event::NewMemo { .. } => "NewMemo",
        }
    }
}

/// Ordered, append-only record of emitted events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    entries: Vec<Event>,
}

impl EventLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn emit(&mut self, event: Event) {
        tracing::debug!(event = event.name(), contract = %event.contract(), "event emitted");
        self.entries.push(event);
    }

    /// All events in emission order.
    pub fn entries(&self) -> &[Event] {
        &self.entries
    }

    /// Events emitted by one contract, in emission order.
    pub fn for_contract<'a>(&'a self, contract: &'a Address) -> impl Iterator<Item = &'a Event> {
        self.entries.iter().filter(move |e| e.contract() == contract)
    }

    /// The most recent event, if any.
    pub fn last(&self) -> Option<&Event> {
        self.entries.last()
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no event has been emitted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
