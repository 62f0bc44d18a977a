//! Native currency amounts.
//!
//! Values are carried as `U256` wei (1 ETH = 10^18 wei). The decimal text is
//! checked here and the unit conversion itself is alloy's, so no precision
//! is lost to floating point.

use alloy_primitives::utils;
use alloy_primitives::U256;
use thiserror::Error;

/// Number of fractional digits in one ether.
pub const ETHER_DECIMALS: usize = 18;

/// Parse a human-readable ether amount (e.g. "0.15") into wei.
pub fn parse_ether(s: &str) -> Result<U256, AmountError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if s.starts_with('-') {
        return Err(AmountError::Negative);
    }

    let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
    let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && frac.is_empty()) || !digits_only(whole) || !digits_only(frac) {
        return Err(AmountError::Invalid(s.to_string()));
    }
    // alloy truncates excess decimals; refuse them instead
    if frac.len() > ETHER_DECIMALS {
        return Err(AmountError::TooPrecise(frac.len()));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let normalized = if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    };
    utils::parse_ether(&normalized).map_err(|e| AmountError::OutOfRange(e.to_string()))
}

/// Format wei as an ether string with trailing zeros trimmed ("0.15", "2").
pub fn format_ether(wei: U256) -> String {
    let full = utils::format_ether(wei);
    match full.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => full,
    }
}

/// Parse a decimal string that must be finite and strictly positive.
pub fn parse_positive_decimal(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount cannot be negative")]
    Negative,

    #[error("Invalid amount: {0}")]
    Invalid(String),

    #[error("Too many decimal places: {0} (max 18)")]
    TooPrecise(usize),

    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wei(v: u128) -> U256 {
        U256::from(v)
    }

    const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_parse_ether() {
        assert_eq!(parse_ether("1").unwrap(), wei(ONE_ETHER));
        assert_eq!(parse_ether("0.1").unwrap(), wei(100_000_000_000_000_000));
        assert_eq!(parse_ether(".5").unwrap(), wei(500_000_000_000_000_000));
        assert_eq!(parse_ether("2.").unwrap(), wei(2 * ONE_ETHER));
        assert_eq!(parse_ether("0.000000000000000001").unwrap(), wei(1));
        assert_eq!(parse_ether(" 0.100000 ").unwrap(), wei(100_000_000_000_000_000));
    }

    #[test]
    fn test_parse_ether_beyond_u128() {
        // 10^21 ETH is more wei than fits in 128 bits
        let big = parse_ether("1000000000000000000000").unwrap();
        assert!(big > U256::from(u128::MAX));
        assert_eq!(format_ether(big), "1000000000000000000000");
    }

    #[test]
    fn test_parse_ether_rejects_garbage() {
        assert_eq!(parse_ether(""), Err(AmountError::Empty));
        assert_eq!(parse_ether("-1"), Err(AmountError::Negative));
        assert!(matches!(parse_ether("abc"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_ether("1e5"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_ether("."), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_ether("1.2.3"), Err(AmountError::Invalid(_))));
        assert_eq!(
            parse_ether("0.0000000000000000001"),
            Err(AmountError::TooPrecise(19))
        );
        assert!(matches!(
            parse_ether(&"9".repeat(80)),
            Err(AmountError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_format_ether() {
        assert_eq!(format_ether(U256::ZERO), "0");
        assert_eq!(format_ether(wei(ONE_ETHER)), "1");
        assert_eq!(format_ether(wei(150_000_000_000_000_000)), "0.15");
        assert_eq!(format_ether(wei(1)), "0.000000000000000001");
        assert_eq!(format_ether(wei(12 * ONE_ETHER + ONE_ETHER / 2)), "12.5");
    }

    #[test]
    fn test_parse_positive_decimal() {
        assert_eq!(parse_positive_decimal("3000000"), Some(3_000_000.0));
        assert_eq!(parse_positive_decimal("0"), None);
        assert_eq!(parse_positive_decimal("-5"), None);
        assert_eq!(parse_positive_decimal("abc"), None);
        assert_eq!(parse_positive_decimal("inf"), None);
        assert_eq!(parse_positive_decimal("NaN"), None);
    }
}
