//! Write-operation dispatcher.
//!
//! validate → request account → submit → wait for confirmation. Failures are
//! classified so the UI can tell a wallet rejection apart from everything
//! else. Only one write is ever in flight; the caller's loading flag
//! enforces that.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::amount::parse_ether;
use crate::contract::{ContractError, DonationContract};

/// A write the user asked for, with amounts still as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteRequest {
    Donate {
        /// Native amount (the converted value), e.g. "0.100000".
        amount: String,
        campaign: Option<u64>,
        message: String,
    },
    Withdraw {
        campaign: u64,
        amount: String,
    },
    CreateCampaign {
        name: String,
        description: String,
        target: String,
    },
}

/// Kind of write, used to decide which form fields to clear on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteKind {
    Donate,
    Withdraw,
    CreateCampaign,
}

impl WriteKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Donate => "Donation",
            Self::Withdraw => "Withdrawal",
            Self::CreateCampaign => "Campaign creation",
        }
    }
}

impl WriteRequest {
    pub fn kind(&self) -> WriteKind {
        match self {
            Self::Donate { .. } => WriteKind::Donate,
            Self::Withdraw { .. } => WriteKind::Withdraw,
            Self::CreateCampaign { .. } => WriteKind::CreateCampaign,
        }
    }

    /// Check the request without touching the wallet.
    pub fn validate(&self) -> Result<(), WriteError> {
        match self {
            Self::Donate { amount, .. } | Self::Withdraw { amount, .. } => {
                validate_amount(amount).map(|_| ())
            }
            Self::CreateCampaign { name, target, .. } => {
                if name.trim().is_empty() {
                    return Err(WriteError::Validation("Campaign name is required".into()));
                }
                validate_amount(target).map(|_| ())
            }
        }
    }
}

/// Parse an amount that must be present, numeric and greater than zero.
pub fn validate_amount(amount: &str) -> Result<U256, WriteError> {
    match parse_ether(amount) {
        Ok(wei) if wei.is_zero() => Err(WriteError::Validation(
            "Amount must be greater than zero".into(),
        )),
        Ok(wei) => Ok(wei),
        Err(e) => Err(WriteError::Validation(format!("Enter a valid amount ({})", e))),
    }
}

/// Result of a confirmed write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub kind: WriteKind,
    pub from: Address,
    pub tx_hash: String,
}

/// Run one write end to end.
pub async fn dispatch<C>(contract: &C, request: &WriteRequest) -> Result<WriteOutcome, WriteError>
where
    C: DonationContract + ?Sized,
{
    request.validate()?;

    let from = contract
        .request_accounts()
        .await
        .map_err(WriteError::from_contract)?;

    log::info!("✍ {} requested from {}", request.kind().label(), from);

    let submitted = match request {
        WriteRequest::Donate {
            amount,
            campaign,
            message,
        } => {
            let value = validate_amount(amount)?;
            // Only campaign donations have a message slot on-chain
            let message = campaign
                .and(Some(message.trim()))
                .filter(|m| !m.is_empty());
            contract.donate(from, value, *campaign, message).await
        }
        WriteRequest::Withdraw { campaign, amount } => {
            let amount = validate_amount(amount)?;
            contract.withdraw(from, *campaign, amount).await
        }
        WriteRequest::CreateCampaign {
            name,
            description,
            target,
        } => {
            let target = validate_amount(target)?;
            contract
                .create_campaign(from, name.trim(), description.trim(), target)
                .await
        }
    };

    let tx_hash = submitted.map_err(WriteError::from_contract)?;
    log::info!("✅ {} confirmed: {}", request.kind().label(), tx_hash);

    Ok(WriteOutcome {
        kind: request.kind(),
        from,
        tx_hash,
    })
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("{0}")]
    Validation(String),

    #[error("Transaction cancelled in wallet")]
    Cancelled,

    #[error("Transaction failed: {0}")]
    Failed(String),
}

impl WriteError {
    /// Classify a contract failure: user rejection vs. everything else.
    pub fn from_contract(err: ContractError) -> Self {
        if err.is_user_rejection() {
            log::info!("Write cancelled by user");
            Self::Cancelled
        } else {
            log::warn!("Write failed: {}", err);
            Self::Failed(err.to_string())
        }
    }
}
