//! Event types for communication between UI and service task.
//!
//! These two enums are the *only* interface between the synchronous egui render
//! loop and the asynchronous service task. No shared state, no Arc, no Mutex.

use donation::{
    Address, Campaign, ExchangeRate, LedgerSnapshot, WriteError, WriteKind, WriteRequest,
};

// ============================================================================
// UI → Service
// ============================================================================

/// Commands sent from the UI thread to the background service task.
#[derive(Debug)]
pub enum UiEvent {
    /// Ask the wallet for account access.
    ConnectWallet,

    /// Re-run every read: rate, owner, campaigns, ledger.
    Refresh,

    /// The campaign selector changed (`None` = all donations).
    SelectCampaign(Option<u64>),

    /// Validated write from one of the forms.
    Submit(WriteRequest),

    /// The user navigated to a new screen — the service may prefetch data.
    NavigatedTo(Screen),

    /// Clean shutdown.
    Shutdown,
}

/// Screens the client can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Donate,
    History,
    Leaderboard,
    Campaigns,
    Settings,
}

// ============================================================================
// Service → UI
// ============================================================================

/// Events sent from the service task back to the UI thread.
#[derive(Debug)]
pub enum ServiceEvent {
    /// Fresh exchange rate from the price feed.
    RateUpdated(ExchangeRate),

    /// Price feed failed; conversion is disabled until the next refresh.
    RateUnavailable(String),

    /// Wallet granted access to this account.
    AccountConnected(Address),

    /// On-chain owner of the contract.
    OwnerLoaded(Address),

    /// Campaign list plus the selection the ledger was loaded for.
    CampaignsLoaded {
        campaigns: Vec<Campaign>,
        selected: Option<u64>,
    },

    /// Aggregated donations for one campaign filter.
    LedgerLoaded {
        campaign: Option<u64>,
        snapshot: LedgerSnapshot,
    },

    /// Non-fatal read failure.
    ReadFailed(String),

    /// A write was confirmed on chain.
    WriteSucceeded {
        kind: WriteKind,
        from: Address,
        tx_hash: String,
    },

    /// A write was rejected, failed validation or reverted.
    WriteFailed(WriteError),

    /// Non-fatal error to display in the UI.
    Error(String),
}
