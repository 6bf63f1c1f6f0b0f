// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # coffeelock Protocol Core Library
//!
//! The settlement primitives every coffeelock contract is built on. Nothing
//! in here knows about vaults or tips; it only knows how to name accounts,
//! move value atomically, tell the time, and record events.
//!
//! ## Architecture
//!
//! - **address**: 20-byte account identifiers and their derivations.
//! - **units**: wei amounts and ether formatting/parsing.
//! - **clock**: injectable time sources (system and manual).
//! - **transfer**: the [`ValueTransfer`] trait contracts pay through.
//! - **bank**: the in-memory settlement layer implementing it.
//! - **event**: the append-only event log.
//! - **call**: the per-invocation context handed to contracts.
//! - **config**: denominations and devnet genesis parameters.
//!
//! ## Design Philosophy
//!
//! 1. Settlement is a capability that is passed in, never ambient state.
//! 2. Every movement of value is all-or-nothing.
//! 3. If it touches money, it has tests. Plural.

pub mod address;
pub mod bank;
pub mod call;
pub mod clock;
pub mod config;
pub mod event;
pub mod transfer;
pub mod units;

pub use address::{Address, AddressError};
pub use bank::InMemoryBank;
pub use call::Call;
pub use clock::{shift_secs, Clock, ClockError, ManualClock, SystemClock, Timestamp};
pub use event::{Event, EventLog};
pub use transfer::{TransferError, ValueTransfer};
pub use units::{format_ether, parse_ether, Amount, UnitsError};
