//! Fiat → native currency conversion for the donation form.

use serde::{Deserialize, Serialize};

use crate::amount::{parse_ether, parse_positive_decimal};

/// Decimal places of a converted amount.
pub const CONVERTED_DECIMALS: usize = 6;

/// Which currency the amount field is typed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EntryMode {
    /// Local fiat, converted through the exchange rate.
    #[default]
    Fiat,
    /// Native currency entered directly; no rate needed.
    Native,
}

/// Convert a fiat amount to the native currency at `rate` fiat per unit.
///
/// Returns `amount / rate` with exactly six decimals, or an empty string when
/// the rate is missing or non-positive, or the amount is missing,
/// non-numeric or non-positive.
pub fn convert_fiat(fiat_amount: &str, rate: Option<f64>) -> String {
    let Some(rate) = rate.filter(|r| r.is_finite() && *r > 0.0) else {
        return String::new();
    };
    let Some(amount) = parse_positive_decimal(fiat_amount) else {
        return String::new();
    };
    format!("{:.prec$}", amount / rate, prec = CONVERTED_DECIMALS)
}

/// The native amount implied by the form input.
///
/// In [`EntryMode::Native`] the input is the amount itself (trimmed), as
/// long as it is a valid positive ether value.
pub fn derive_amount(input: &str, mode: EntryMode, rate: Option<f64>) -> String {
    match mode {
        EntryMode::Fiat => convert_fiat(input, rate),
        EntryMode::Native => match parse_ether(input) {
            Ok(wei) if !wei.is_zero() => input.trim().to_string(),
            _ => String::new(),
        },
    }
}
