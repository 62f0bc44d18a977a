//! Donation contract interface.
//!
//! [`DonationContract`] is the seam between the client and the deployed
//! contract. [`ContractClient`] speaks the contract ABI through the wallet
//! provider, with call and return layouts generated by alloy's `sol!`.

use alloy_primitives::{Address, U256};
use alloy_sol_types::{sol, SolCall};
use async_trait::async_trait;

use crate::provider::{ProviderError, RpcProvider, TxRequest};
use crate::types::{Campaign, DonationRecord};

sol! {
    /// Campaign-aware donation contract.
    interface IDonation {
        function getDonationsCount() external view returns (uint256);
        function getDonation(uint256 index) external view returns (
            address donor,
            uint256 amount,
            uint256 timestamp,
            string message,
            uint256 campaignId
        );
        function getCampaignsCount() external view returns (uint256);
        function getCampaign(uint256 index) external view returns (
            string name,
            string description,
            uint256 target,
            uint256 totalDonated,
            bool active
        );
        function owner() external view returns (address);
        function donate() external payable;
        function donate(uint256 campaignId, string message) external payable;
        function withdraw(uint256 campaignId, uint256 amount) external;
        function createCampaign(string name, string description, uint256 target) external;
    }

    /// Contracts deployed before campaigns existed.
    interface ILegacyDonation {
        function getDonation(uint256 index) external view returns (
            address donor,
            uint256 amount,
            uint256 timestamp
        );
    }
}

/// Read and write surface of the donation contract.
///
/// Write methods resolve only after the transaction is confirmed and return
/// its hash.
#[async_trait]
pub trait DonationContract: Send + Sync {
    async fn donation_count(&self) -> Result<u64, ContractError>;

    async fn donation(&self, index: u64) -> Result<DonationRecord, ContractError>;

    async fn campaign_count(&self) -> Result<u64, ContractError>;

    async fn campaign(&self, index: u64) -> Result<Campaign, ContractError>;

    async fn owner(&self) -> Result<Address, ContractError>;

    /// Request wallet account access and return the selected account.
    async fn request_accounts(&self) -> Result<Address, ContractError>;

    /// Send `value` wei. With a campaign the message is recorded alongside;
    /// without one the legacy `donate()` entry point is used and there is
    /// nowhere to put a message.
    async fn donate(
        &self,
        from: Address,
        value: U256,
        campaign: Option<u64>,
        message: Option<&str>,
    ) -> Result<String, ContractError>;

    async fn withdraw(&self, from: Address, campaign: u64, amount: U256)
        -> Result<String, ContractError>;

    async fn create_campaign(
        &self,
        from: Address,
        name: &str,
        description: &str,
        target: U256,
    ) -> Result<String, ContractError>;
}

/// ABI client for a deployed donation contract.
#[derive(Debug, Clone)]
pub struct ContractClient {
    provider: RpcProvider,
    address: Address,
}

impl ContractClient {
    pub fn new(provider: RpcProvider, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn read_raw(&self, signature: &str, data: Vec<u8>) -> Result<Vec<u8>, ContractError> {
        let output = self.provider.call(&self.address, &data).await?;
        if output.is_empty() {
            // Calling a missing function on a contract without a fallback
            // returns empty data rather than an error
            return Err(ContractError::EmptyReturn(signature.to_string()));
        }
        Ok(output)
    }

    async fn read<C>(&self, call: C) -> Result<C::Return, ContractError>
    where
        C: SolCall + Send,
    {
        let output = self.read_raw(C::SIGNATURE, call.abi_encode()).await?;
        Ok(C::abi_decode_returns(&output, true)?)
    }

    async fn write<C>(&self, from: Address, value: U256, call: C) -> Result<String, ContractError>
    where
        C: SolCall + Send,
    {
        let tx = TxRequest {
            from,
            to: self.address,
            value,
            data: call.abi_encode(),
        };
        let hash = self.provider.send_transaction(&tx).await?;
        self.provider.wait_for_receipt(&hash).await?;
        Ok(hash)
    }
}

/// Decode `getDonation` output.
///
/// Campaign contracts return `(address,uint256,uint256,string,uint256)`;
/// legacy contracts stop after the timestamp and carry no campaign.
pub fn decode_donation(index: u64, data: &[u8]) -> Result<DonationRecord, ContractError> {
    if let Ok(ret) = IDonation::getDonationCall::abi_decode_returns(data, true) {
        return Ok(DonationRecord {
            index,
            donor: ret.donor,
            amount: ret.amount,
            timestamp: to_timestamp(ret.timestamp)?,
            message: (!ret.message.is_empty()).then_some(ret.message),
            campaign: Some(to_u64(ret.campaignId, "campaign id")?),
        });
    }

    let ret = ILegacyDonation::getDonationCall::abi_decode_returns(data, true)?;
    Ok(DonationRecord {
        index,
        donor: ret.donor,
        amount: ret.amount,
        timestamp: to_timestamp(ret.timestamp)?,
        message: None,
        campaign: None,
    })
}

/// Decode `getCampaign` output: `(string,string,uint256,uint256,bool)`.
pub fn decode_campaign(id: u64, data: &[u8]) -> Result<Campaign, ContractError> {
    let ret = IDonation::getCampaignCall::abi_decode_returns(data, true)?;
    Ok(Campaign {
        id,
        name: ret.name,
        description: ret.description,
        target: ret.target,
        total_donated: ret.totalDonated,
        active: ret.active,
    })
}

fn to_u64(value: U256, field: &'static str) -> Result<u64, ContractError> {
    u64::try_from(value).map_err(|_| ContractError::OutOfRange { field, value })
}

fn to_timestamp(value: U256) -> Result<i64, ContractError> {
    let seconds = to_u64(value, "timestamp")?;
    i64::try_from(seconds).map_err(|_| ContractError::OutOfRange {
        field: "timestamp",
        value,
    })
}

#[async_trait]
impl DonationContract for ContractClient {
    async fn donation_count(&self) -> Result<u64, ContractError> {
        let ret = self.read(IDonation::getDonationsCountCall {}).await?;
        to_u64(ret._0, "donation count")
    }

    async fn donation(&self, index: u64) -> Result<DonationRecord, ContractError> {
        let call = IDonation::getDonationCall {
            index: U256::from(index),
        };
        let out = self
            .read_raw(IDonation::getDonationCall::SIGNATURE, call.abi_encode())
            .await?;
        decode_donation(index, &out)
    }

    async fn campaign_count(&self) -> Result<u64, ContractError> {
        let ret = self.read(IDonation::getCampaignsCountCall {}).await?;
        to_u64(ret._0, "campaign count")
    }

    async fn campaign(&self, index: u64) -> Result<Campaign, ContractError> {
        let call = IDonation::getCampaignCall {
            index: U256::from(index),
        };
        let out = self
            .read_raw(IDonation::getCampaignCall::SIGNATURE, call.abi_encode())
            .await?;
        decode_campaign(index, &out)
    }

    async fn owner(&self) -> Result<Address, ContractError> {
        Ok(self.read(IDonation::ownerCall {}).await?._0)
    }

    async fn request_accounts(&self) -> Result<Address, ContractError> {
        self.provider
            .request_accounts()
            .await?
            .into_iter()
            .next()
            .ok_or(ContractError::NoAccount)
    }

    async fn donate(
        &self,
        from: Address,
        value: U256,
        campaign: Option<u64>,
        message: Option<&str>,
    ) -> Result<String, ContractError> {
        match campaign {
            Some(id) => {
                let call = IDonation::donate_1Call {
                    campaignId: U256::from(id),
                    message: message.unwrap_or_default().to_string(),
                };
                self.write(from, value, call).await
            }
            None => {
                if message.is_some() {
                    log::warn!("Legacy donate() has no message field; message not sent");
                }
                self.write(from, value, IDonation::donate_0Call {}).await
            }
        }
    }

    async fn withdraw(
        &self,
        from: Address,
        campaign: u64,
        amount: U256,
    ) -> Result<String, ContractError> {
        let call = IDonation::withdrawCall {
            campaignId: U256::from(campaign),
            amount,
        };
        self.write(from, U256::ZERO, call).await
    }

    async fn create_campaign(
        &self,
        from: Address,
        name: &str,
        description: &str,
        target: U256,
    ) -> Result<String, ContractError> {
        let call = IDonation::createCampaignCall {
            name: name.to_string(),
            description: description.to_string(),
            target,
        };
        self.write(from, U256::ZERO, call).await
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("ABI decode error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Contract returned no data for {0}")]
    EmptyReturn(String),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: U256 },

    #[error("Wallet returned no accounts")]
    NoAccount,
}

impl ContractError {
    /// Whether the wallet reports that the user declined the request.
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, Self::Provider(e) if e.is_user_rejection())
    }
}
