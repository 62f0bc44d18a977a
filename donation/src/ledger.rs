//! Ledger mirror — local, read-only view of the contract's donation records.
//!
//! Records are refetched in bulk on every load: one count call, then one
//! call per index, each awaited before the next. Totals and the leaderboard
//! are pure aggregations over whatever set was loaded.

use alloy_primitives::{Address, U256};
use std::collections::HashMap;

use crate::contract::{ContractError, DonationContract};
use crate::types::{Campaign, DonationRecord, LeaderboardEntry};

/// Number of donors shown on the leaderboard.
pub const LEADERBOARD_SIZE: usize = 5;

/// Everything the history and leaderboard screens display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// Newest first.
    pub donations: Vec<DonationRecord>,
    /// Sum of `donations` in wei.
    pub total: U256,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl LedgerSnapshot {
    /// Aggregate an already-fetched record set under a campaign filter.
    pub fn from_records(records: Vec<DonationRecord>, campaign: Option<u64>) -> Self {
        let mut donations = filter_by_campaign(records, campaign);
        donations.sort_by(|a, b| b.index.cmp(&a.index));
        let total = total_amount(&donations);
        let leaderboard = leaderboard(&donations, LEADERBOARD_SIZE);
        Self {
            donations,
            total,
            leaderboard,
        }
    }
}

/// Read every donation record, newest first.
pub async fn fetch_donations<C>(contract: &C) -> Result<Vec<DonationRecord>, LedgerError>
where
    C: DonationContract + ?Sized,
{
    let count = contract
        .donation_count()
        .await
        .map_err(|source| LedgerError::Read {
            what: "donation count".to_string(),
            source,
        })?;

    // The count comes from the contract; allocate as records arrive
    let mut records = Vec::new();
    for index in (0..count).rev() {
        let record = contract
            .donation(index)
            .await
            .map_err(|source| LedgerError::Read {
                what: format!("donation #{}", index),
                source,
            })?;
        records.push(record);
    }

    log::info!("📜 Loaded {} donation records", records.len());
    Ok(records)
}

/// Read every campaign in id order.
pub async fn fetch_campaigns<C>(contract: &C) -> Result<Vec<Campaign>, LedgerError>
where
    C: DonationContract + ?Sized,
{
    let count = contract
        .campaign_count()
        .await
        .map_err(|source| LedgerError::Read {
            what: "campaign count".to_string(),
            source,
        })?;

    let mut campaigns = Vec::new();
    for index in 0..count {
        let campaign = contract
            .campaign(index)
            .await
            .map_err(|source| LedgerError::Read {
                what: format!("campaign #{}", index),
                source,
            })?;
        campaigns.push(campaign);
    }

    log::info!("📋 Loaded {} campaigns", campaigns.len());
    Ok(campaigns)
}

/// Fetch and aggregate the donation ledger for one campaign (or all).
pub async fn load_ledger<C>(contract: &C, campaign: Option<u64>) -> Result<LedgerSnapshot, LedgerError>
where
    C: DonationContract + ?Sized,
{
    let records = fetch_donations(contract).await?;
    Ok(LedgerSnapshot::from_records(records, campaign))
}

/// Keep only records of `campaign`; `None` keeps everything.
pub fn filter_by_campaign(records: Vec<DonationRecord>, campaign: Option<u64>) -> Vec<DonationRecord> {
    match campaign {
        None => records,
        Some(id) => records
            .into_iter()
            .filter(|r| r.campaign == Some(id))
            .collect(),
    }
}

/// Sum of amounts in wei.
pub fn total_amount(records: &[DonationRecord]) -> U256 {
    records
        .iter()
        .fold(U256::ZERO, |acc, r| acc.saturating_add(r.amount))
}

/// Group by donor, sum, and keep the `k` largest totals in descending order.
///
/// Equal totals are ordered by donor address so the result does not depend
/// on input order.
pub fn leaderboard(records: &[DonationRecord], k: usize) -> Vec<LeaderboardEntry> {
    let mut by_donor: HashMap<Address, (U256, usize)> = HashMap::new();
    for record in records {
        let entry = by_donor.entry(record.donor).or_insert((U256::ZERO, 0));
        entry.0 = entry.0.saturating_add(record.amount);
        entry.1 += 1;
    }

    let mut entries: Vec<LeaderboardEntry> = by_donor
        .into_iter()
        .map(|(donor, (total, donations))| LeaderboardEntry {
            donor,
            total,
            donations,
        })
        .collect();
    entries.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.donor.cmp(&b.donor)));
    entries.truncate(k);
    entries
}

/// Campaign the selector should show after `campaigns` is (re)loaded.
///
/// Keeps `current` when it still exists, otherwise falls back to the first
/// active campaign, then the first campaign; `None` for contracts without
/// campaigns.
pub fn default_campaign(campaigns: &[Campaign], current: Option<u64>) -> Option<u64> {
    if let Some(id) = current {
        if campaigns.iter().any(|c| c.id == id) {
            return Some(id);
        }
    }
    campaigns
        .iter()
        .find(|c| c.active)
        .or_else(|| campaigns.first())
        .map(|c| c.id)
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Failed to read {what}: {source}")]
    Read {
        what: String,
        #[source]
        source: ContractError,
    },
}
