//! Donation Contract Client
//!
//! Thin client for a donation smart contract:
//! - `U256` wei amounts with exact decimal parsing/formatting
//! - alloy `sol!` bindings for the contract's call and return layouts
//! - JSON-RPC 2.0 wallet provider (EIP-1193 methods over HTTP)
//! - Fiat price feed and fiat → native currency converter
//! - Ledger mirror: donation history, totals and top-donor leaderboard
//! - Write dispatcher with wallet-rejection classification

pub mod address;
pub mod amount;
pub mod contract;
pub mod converter;
pub mod dispatcher;
pub mod ledger;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod price_feed;
pub mod provider;
pub mod types;

pub use address::{parse_address, Address, AddressError, AddressExt};
pub use amount::{format_ether, parse_ether, parse_positive_decimal, AmountError};
pub use alloy_primitives::U256;
pub use contract::{ContractClient, ContractError, DonationContract, IDonation};
pub use converter::{convert_fiat, derive_amount, EntryMode, CONVERTED_DECIMALS};
pub use dispatcher::{dispatch, validate_amount, WriteError, WriteKind, WriteOutcome, WriteRequest};
pub use ledger::{
    default_campaign, fetch_campaigns, fetch_donations, filter_by_campaign, leaderboard,
    load_ledger, total_amount, LedgerError, LedgerSnapshot, LEADERBOARD_SIZE,
};
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockContract;
pub use price_feed::{CoinGeckoFeed, FixedRateFeed, PriceFeed, PriceFeedError};
pub use provider::{ProviderError, Receipt, ReceiptPolicy, RpcProvider, TxRequest};
pub use types::{Campaign, DonationRecord, ExchangeRate, LeaderboardEntry};
