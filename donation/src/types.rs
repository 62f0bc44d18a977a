//! Records mirrored from the donation contract.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::address::Address;

/// One donation as stored on-chain. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationRecord {
    /// On-chain index; higher means more recent.
    pub index: u64,
    pub donor: Address,
    /// Amount in wei.
    pub amount: U256,
    /// Unix timestamp (seconds) of the block that recorded the donation.
    pub timestamp: i64,
    pub message: Option<String>,
    pub campaign: Option<u64>,
}

/// A fundraising target. Only ever changed by contract writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    /// Campaign index in the contract; used as the campaign identifier.
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Target in wei. `U256::MAX` is a common "no cap" value.
    pub target: U256,
    /// Total received in wei.
    pub total_donated: U256,
    pub active: bool,
}

impl Campaign {
    /// Progress towards the target in the range `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        const SCALE: u64 = 10_000;
        if self.target.is_zero() {
            return 0.0;
        }
        if self.total_donated >= self.target {
            return 1.0;
        }
        let scale = U256::from(SCALE);
        let basis_points = match self.total_donated.checked_mul(scale) {
            Some(scaled) => scaled / self.target,
            // total > MAX / SCALE, and target is larger still
            None => self.total_donated / (self.target / scale),
        };
        basis_points.saturating_to::<u64>().min(SCALE) as f32 / SCALE as f32
    }
}

/// A donor's aggregated contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub donor: Address,
    /// Sum of all donations in wei.
    pub total: U256,
    pub donations: usize,
}

/// Price of one unit of the native currency in local fiat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    /// Lowercase fiat code, e.g. "idr".
    pub fiat: String,
    pub price: f64,
}
