//! # Denominations
//!
//! Amounts are integers in the smallest unit (wei). Nothing in the protocol
//! ever divides an amount; the helpers here exist purely for humans, turning
//! `1500000000000000000` into `"1.5"` and back.

use thiserror::Error;

use crate::config::{ETHER_DECIMALS, WEI_PER_ETHER};

/// An amount of value in wei.
pub type Amount = u128;

/// Errors produced by [`parse_ether`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UnitsError {
    /// Nothing to parse.
    #[error("empty amount")]
    Empty,

    /// A character other than a digit or a single decimal point.
    #[error("invalid amount: {0}")]
    InvalidDigit(String),

    /// More fractional digits than wei can represent.
    #[error("too many decimal places: {0}")]
    TooManyDecimals(usize),

    /// The value does not fit in an [`Amount`].
    #[error("amount overflows: {0}")]
    Overflow(String),
}

/// Formats a wei amount as a decimal ether string.
///
/// Always includes at least one fractional digit: `0` becomes `"0.0"`,
/// one ether becomes `"1.0"`.
pub fn format_ether(amount: Amount) -> String {
    let whole = amount / WEI_PER_ETHER;
    let frac = amount % WEI_PER_ETHER;
    let frac = format!("{:0width$}", frac, width = ETHER_DECIMALS);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, frac)
    }
}

/// Parses a decimal ether string (`"1"`, `"0.25"`, `"1.000000000000000001"`)
/// into wei.
pub fn parse_ether(input: &str) -> Result<Amount, UnitsError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UnitsError::Empty);
    }

    let (whole, frac) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(UnitsError::InvalidDigit(input.to_string()));
    }
    if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
        return Err(UnitsError::InvalidDigit(input.to_string()));
    }
    if frac.len() > ETHER_DECIMALS {
        return Err(UnitsError::TooManyDecimals(frac.len()));
    }

    let overflow = || UnitsError::Overflow(input.to_string());

    let whole_wei = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<Amount>()
            .map_err(|_| overflow())?
            .checked_mul(WEI_PER_ETHER)
            .ok_or_else(overflow)?
    };

    let frac_wei = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<width$}", frac, width = ETHER_DECIMALS);
        padded.parse::<Amount>().map_err(|_| overflow())?
    };

    whole_wei.checked_add(frac_wei).ok_or_else(overflow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_whole_and_fractional() {
        assert_eq!(format_ether(0), "0.0");
        assert_eq!(format_ether(WEI_PER_ETHER), "1.0");
        assert_eq!(format_ether(WEI_PER_ETHER * 3 / 2), "1.5");
        assert_eq!(format_ether(1), "0.000000000000000001");
    }

    #[test]
    fn parse_common_inputs() {
        assert_eq!(parse_ether("1").unwrap(), WEI_PER_ETHER);
        assert_eq!(parse_ether("0.5").unwrap(), WEI_PER_ETHER / 2);
        assert_eq!(parse_ether(".5").unwrap(), WEI_PER_ETHER / 2);
        assert_eq!(parse_ether("2.").unwrap(), 2 * WEI_PER_ETHER);
        assert_eq!(parse_ether("0.000000001").unwrap(), 1_000_000_000);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_ether(""), Err(UnitsError::Empty));
        assert!(matches!(parse_ether("."), Err(UnitsError::InvalidDigit(_))));
        assert!(matches!(parse_ether("1.2.3"), Err(UnitsError::InvalidDigit(_))));
        assert!(matches!(parse_ether("-1"), Err(UnitsError::InvalidDigit(_))));
        assert!(matches!(
            parse_ether("0.0000000000000000001"),
            Err(UnitsError::TooManyDecimals(19))
        ));
        assert!(matches!(
            parse_ether("999999999999999999999999999999999"),
            Err(UnitsError::Overflow(_))
        ));
    }

    #[test]
    fn format_then_parse_is_lossless() {
        let amount = 12_345_678_901_234_567_890;
        assert_eq!(parse_ether(&format_ether(amount)).unwrap(), amount);
    }
}
