//! # Protocol Configuration & Constants
//!
//! Every magic number in coffeelock lives here. Denominations, devnet
//! genesis parameters, and the default state file location.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The protocol version string reported by the node binary.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Number of decimal places between wei and ether.
pub const ETHER_DECIMALS: usize = 18;

/// One ether, in wei.
pub const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;

/// One gwei, in wei. The lock tests deposit exactly this much.
pub const WEI_PER_GWEI: u128 = 1_000_000_000;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Seconds in a (non-leap) year. Default lock duration for the devnet.
pub const ONE_YEAR_SECS: i64 = 365 * 24 * 60 * 60;

// ---------------------------------------------------------------------------
// Devnet Genesis
// ---------------------------------------------------------------------------

/// Number of pre-funded accounts created by `init`.
pub const DEVNET_ACCOUNT_COUNT: usize = 20;

/// Starting balance of every pre-funded devnet account: 10,000 ether.
pub const DEVNET_ACCOUNT_BALANCE: u128 = 10_000 * WEI_PER_ETHER;

/// Seed prefix for devnet account derivation. Account `i` is
/// `Address::derive("account-<i>")`.
pub const DEVNET_ACCOUNT_SEED_PREFIX: &str = "account-";

/// Default file name for the persisted devnet state.
pub const DEFAULT_STATE_FILE: &str = "coffeelock-state.json";

/// Returns the derivation seed of the `index`-th devnet account.
pub fn devnet_account_seed(index: usize) -> String {
    format!("{}{}", DEVNET_ACCOUNT_SEED_PREFIX, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denominations_are_consistent() {
        assert_eq!(WEI_PER_ETHER, 10u128.pow(ETHER_DECIMALS as u32));
        assert_eq!(WEI_PER_ETHER / WEI_PER_GWEI, 1_000_000_000);
    }

    #[test]
    fn devnet_balance_fits_many_accounts() {
        // The whole genesis supply must fit in an Amount with room to spare.
        let total = DEVNET_ACCOUNT_BALANCE
            .checked_mul(DEVNET_ACCOUNT_COUNT as u128)
            .unwrap();
        assert!(total < u128::MAX / 2);
    }

    #[test]
    fn account_seeds_are_indexed() {
        assert_eq!(devnet_account_seed(0), "account-0");
        assert_eq!(devnet_account_seed(19), "account-19");
    }
}
