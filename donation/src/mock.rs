//! In-memory donation contract for tests and offline demos.
//!
//! Only compiled for this crate's tests or with the `test-util` feature.

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard};

use crate::contract::{ContractError, DonationContract, IDonation};
use crate::provider::{ProviderError, USER_REJECTED_CODE};
use crate::types::{Campaign, DonationRecord};

#[derive(Debug, Default)]
struct MockLedger {
    donations: Vec<DonationRecord>,
    campaigns: Vec<Campaign>,
    clock: i64,
    tx_counter: u64,
    reject_writes: bool,
    fail_reads: bool,
    reads: usize,
}

/// In-memory donation contract.
///
/// Behaves like the deployed contract for the client's purposes: donations
/// are appended with increasing indices and timestamps, campaign totals
/// follow donations and withdrawals, and only the owner may create
/// campaigns or withdraw. Wallet rejection and read failures can be
/// simulated.
#[derive(Debug)]
pub struct MockContract {
    owner: Address,
    account: Address,
    inner: Mutex<MockLedger>,
}

impl MockContract {
    pub fn new(owner: Address, account: Address) -> Self {
        Self {
            owner,
            account,
            inner: Mutex::new(MockLedger {
                clock: 1_700_000_000,
                ..MockLedger::default()
            }),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, MockLedger> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a donation as if it had been mined earlier.
    pub fn push_donation(&self, donor: Address, amount: U256, campaign: Option<u64>) {
        let mut ledger = self.ledger();
        ledger.clock += 60;
        let record = DonationRecord {
            index: ledger.donations.len() as u64,
            donor,
            amount,
            timestamp: ledger.clock,
            message: None,
            campaign,
        };
        if let Some(c) = campaign.and_then(|id| ledger.campaigns.get_mut(id as usize)) {
            c.total_donated = c.total_donated.saturating_add(amount);
        }
        ledger.donations.push(record);
    }

    /// Seed a campaign; returns its id.
    pub fn push_campaign(&self, name: &str, target: U256, active: bool) -> u64 {
        let mut ledger = self.ledger();
        let id = ledger.campaigns.len() as u64;
        ledger.campaigns.push(Campaign {
            id,
            name: name.to_string(),
            description: String::new(),
            target,
            total_donated: U256::ZERO,
            active,
        });
        id
    }

    /// Make every following write fail as if the user declined in the wallet.
    pub fn set_reject_writes(&self, reject: bool) {
        self.ledger().reject_writes = reject;
    }

    /// Make every following read fail.
    pub fn set_fail_reads(&self, fail: bool) {
        self.ledger().fail_reads = fail;
    }

    /// Number of read calls served so far.
    pub fn read_count(&self) -> usize {
        self.ledger().reads
    }

    fn begin_read(&self) -> Result<MutexGuard<'_, MockLedger>, ContractError> {
        let mut ledger = self.ledger();
        if ledger.fail_reads {
            return Err(ContractError::Provider(ProviderError::http(503)));
        }
        ledger.reads += 1;
        Ok(ledger)
    }

    fn begin_write(&self, from: Address) -> Result<MutexGuard<'_, MockLedger>, ContractError> {
        let mut ledger = self.ledger();
        if ledger.reject_writes {
            return Err(rejected());
        }
        if from != self.account {
            return Err(ContractError::Provider(ProviderError::Rpc {
                code: 4100,
                message: "The requested account has not been authorized".to_string(),
            }));
        }
        ledger.tx_counter += 1;
        Ok(ledger)
    }
}

fn rejected() -> ContractError {
    ContractError::Provider(ProviderError::Rpc {
        code: USER_REJECTED_CODE,
        message: "User rejected the request.".to_string(),
    })
}

fn reverted(tx_hash: String) -> ContractError {
    ContractError::Provider(ProviderError::Reverted(tx_hash))
}

#[async_trait]
impl DonationContract for MockContract {
    async fn donation_count(&self) -> Result<u64, ContractError> {
        Ok(self.begin_read()?.donations.len() as u64)
    }

    async fn donation(&self, index: u64) -> Result<DonationRecord, ContractError> {
        self.begin_read()?
            .donations
            .get(index as usize)
            .cloned()
            .ok_or_else(|| {
                ContractError::EmptyReturn(IDonation::getDonationCall::SIGNATURE.to_string())
            })
    }

    async fn campaign_count(&self) -> Result<u64, ContractError> {
        Ok(self.begin_read()?.campaigns.len() as u64)
    }

    async fn campaign(&self, index: u64) -> Result<Campaign, ContractError> {
        self.begin_read()?
            .campaigns
            .get(index as usize)
            .cloned()
            .ok_or_else(|| {
                ContractError::EmptyReturn(IDonation::getCampaignCall::SIGNATURE.to_string())
            })
    }

    async fn owner(&self) -> Result<Address, ContractError> {
        self.begin_read()?;
        Ok(self.owner)
    }

    async fn request_accounts(&self) -> Result<Address, ContractError> {
        if self.ledger().reject_writes {
            return Err(rejected());
        }
        Ok(self.account)
    }

    async fn donate(
        &self,
        from: Address,
        value: U256,
        campaign: Option<u64>,
        message: Option<&str>,
    ) -> Result<String, ContractError> {
        let mut ledger = self.begin_write(from)?;
        let tx_hash = format!("0x{:064x}", ledger.tx_counter);
        if let Some(id) = campaign {
            match ledger.campaigns.get_mut(id as usize) {
                Some(c) if c.active => c.total_donated = c.total_donated.saturating_add(value),
                _ => return Err(reverted(tx_hash)),
            }
        }
        ledger.clock += 60;
        let record = DonationRecord {
            index: ledger.donations.len() as u64,
            donor: from,
            amount: value,
            timestamp: ledger.clock,
            message: campaign.and(message.filter(|m| !m.is_empty()).map(str::to_string)),
            campaign,
        };
        ledger.donations.push(record);
        Ok(tx_hash)
    }

    async fn withdraw(
        &self,
        from: Address,
        campaign: u64,
        amount: U256,
    ) -> Result<String, ContractError> {
        let mut ledger = self.begin_write(from)?;
        let tx_hash = format!("0x{:064x}", ledger.tx_counter);
        if from != self.owner {
            return Err(reverted(tx_hash));
        }
        match ledger.campaigns.get_mut(campaign as usize) {
            Some(c) if c.total_donated >= amount => c.total_donated -= amount,
            _ => return Err(reverted(tx_hash)),
        }
        Ok(tx_hash)
    }

    async fn create_campaign(
        &self,
        from: Address,
        name: &str,
        description: &str,
        target: U256,
    ) -> Result<String, ContractError> {
        let mut ledger = self.begin_write(from)?;
        let tx_hash = format!("0x{:064x}", ledger.tx_counter);
        if from != self.owner {
            return Err(reverted(tx_hash));
        }
        let id = ledger.campaigns.len() as u64;
        ledger.campaigns.push(Campaign {
            id,
            name: name.to_string(),
            description: description.to_string(),
            target,
            total_donated: U256::ZERO,
            active: true,
        });
        Ok(tx_hash)
    }
}
