//! Account and contract addresses.
//!
//! The address type itself is alloy's 20-byte [`Address`]. Text coming from
//! the wallet or the config file goes through [`parse_address`], which
//! insists on the `0x` prefix both of them use.

use alloy_primitives::hex;
use thiserror::Error;

pub use alloy_primitives::Address;

/// Parse a `0x`-prefixed, 40 hex digit address in any letter case.
pub fn parse_address(s: &str) -> Result<Address, AddressError> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or(AddressError::MissingPrefix)?;
    if digits.len() != 40 {
        return Err(AddressError::InvalidLength(digits.len()));
    }

    let mut bytes = [0u8; 20];
    hex::decode_to_slice(digits, &mut bytes).map_err(|_| AddressError::InvalidHex)?;
    Ok(Address::from(bytes))
}

/// Display helpers for addresses in tables and headers.
pub trait AddressExt {
    /// Abbreviated lowercase form: `0x5aae...aeed`.
    fn short(&self) -> String;
}

impl AddressExt for Address {
    fn short(&self) -> String {
        let full = hex::encode_prefixed(self.as_slice());
        format!("{}...{}", &full[..6], &full[full.len() - 4..])
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Address must start with 0x")]
    MissingPrefix,

    #[error("Invalid address length: {0} hex digits (expected 40)")]
    InvalidLength(usize),

    #[error("Invalid hex character in address")]
    InvalidHex,
}
