//! # Account Addresses
//!
//! Every participant on a coffeelock chain, externally owned accounts and
//! deployed contracts alike, is identified by a 20-byte [`Address`].
//! Addresses are opaque: the only things you can do with one are compare it,
//! hash it, and print it.
//!
//! Two derivations exist:
//!
//! - [`Address::derive`] hashes a human-readable seed with BLAKE3. The devnet
//!   uses it for its pre-funded accounts (`account-0`, `account-1`, ...).
//! - [`Address::for_contract`] hashes `(deployer || nonce)`, so the same
//!   deployer never produces the same contract address twice.
//!
//! The textual form is `0x` followed by 40 lowercase hex characters, and
//! that is also the serde representation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Length of an address in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Errors produced when parsing an address from text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    /// The string did not start with `0x`.
    #[error("address must start with 0x: {0}")]
    MissingPrefix(String),

    /// The hex payload had the wrong number of characters.
    #[error("address must be {expected} hex characters, got {actual}")]
    InvalidLength {
        /// Required number of hex characters.
        expected: usize,
        /// Number of hex characters supplied.
        actual: usize,
    },

    /// The payload contained non-hex characters.
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),
}

/// A 20-byte account identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Deterministically derives an address from a textual seed.
    pub fn derive(seed: &str) -> Self {
        Self::truncate(blake3::hash(seed.as_bytes()).as_bytes())
    }

    /// Derives the address of the `nonce`-th contract deployed by `deployer`.
    pub fn for_contract(deployer: &Address, nonce: u64) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"coffeelock/contract");
        hasher.update(&deployer.0);
        hasher.update(&nonce.to_be_bytes());
        Self::truncate(hasher.finalize().as_bytes())
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    fn truncate(digest: &[u8; 32]) -> Self {
        let mut out = [0u8; ADDRESS_LENGTH];
        out.copy_from_slice(&digest[..ADDRESS_LENGTH]);
        Self(out)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| AddressError::MissingPrefix(s.to_string()))?;

        if body.len() != ADDRESS_LENGTH * 2 {
            return Err(AddressError::InvalidLength {
                expected: ADDRESS_LENGTH * 2,
                actual: body.len(),
            });
        }

        let mut out = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(body, &mut out)
            .map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Ok(Self(out))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_is_deterministic() {
        assert_eq!(Address::derive("alice"), Address::derive("alice"));
        assert_ne!(Address::derive("alice"), Address::derive("bob"));
    }

    #[test]
    fn contract_addresses_differ_by_nonce() {
        let deployer = Address::derive("deployer");
        let first = Address::for_contract(&deployer, 0);
        let second = Address::for_contract(&deployer, 1);
        assert_ne!(first, second);
        assert_ne!(first, deployer);
    }

    #[test]
    fn hex_form_parses_back() {
        let addr = Address::derive("carol");
        let text = addr.to_string();
        assert!(text.starts_with("0x"));
        assert_eq!(text.len(), 42);
        assert_eq!(text.parse::<Address>().unwrap(), addr);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(matches!(
            "deadbeef".parse::<Address>(),
            Err(AddressError::MissingPrefix(_))
        ));
        assert!(matches!(
            "0xdead".parse::<Address>(),
            Err(AddressError::InvalidLength { actual: 4, .. })
        ));
        let bad = format!("0x{}", "zz".repeat(ADDRESS_LENGTH));
        assert!(matches!(
            bad.parse::<Address>(),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn serializes_as_hex_string() {
        let addr = Address::derive("dave");
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_hex()));
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
