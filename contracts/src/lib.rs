//! # coffeelock Contracts
//!
//! On-chain logic for coffeelock. Two contracts, both built on the
//! settlement primitives of `coffeelock-protocol`:
//!
//! - **Time-Locked Vault**: a single deposit released to its owner only
//!   after a deadline, exactly once.
//! - **Tip Ledger**: tips tagged with a name and message, recorded as an
//!   append-only memo log, swept by the owner at will.
//!
//! ## Design Principles
//!
//! 1. All monetary operations check for overflow. Wrapping arithmetic and
//!    money do not mix.
//! 2. Internal balances are updated before value leaves the contract, and a
//!    failed payout restores them (see [`custody::sweep`]).
//! 3. A failed call leaves no trace: no balance change, no memo, no event.
//! 4. Every public type is serializable (serde) for persistent storage.

pub mod custody;
pub mod time_lock_vault;
pub mod tip_ledger;

pub use custody::NotOwner;
pub use time_lock_vault::{LockError, TimeLockVault, VaultStatus};
pub use tip_ledger::{Memo, TipError, TipLedger};
