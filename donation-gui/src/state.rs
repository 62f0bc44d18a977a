//! Application state — plain data, no async, no Arc.
//!
//! `AppState` holds everything the UI needs to render. The service task sends
//! `ServiceEvent`s which are applied via `AppState::apply()`. The UI reads
//! fields directly — no locking, no channels.
//!
//! Writes follow idle → submitting → (success | failure) → idle, driven by
//! the single `loading` flag: a `begin_*` call refuses to start while another
//! write is pending.

use donation::{
    derive_amount, parse_positive_decimal, validate_amount, Address, Campaign, DonationRecord,
    EntryMode, ExchangeRate, LeaderboardEntry, WriteKind, WriteRequest, U256,
};

use crate::events::{Screen, ServiceEvent};

/// All application state needed for rendering.
#[derive(Debug)]
pub struct AppState {
    // -- Navigation --
    pub screen: Screen,

    // -- Chain --
    pub contract_address: Option<Address>,
    pub account: Option<Address>,
    pub owner: Option<Address>,

    // -- Price --
    pub fiat_currency: String,
    pub rate: Option<ExchangeRate>,

    // -- Donate form --
    pub fiat_input: String,
    pub entry_mode: EntryMode,
    /// Native amount derived from `fiat_input`; empty when not computable.
    pub converted_amount: String,
    pub message_input: String,

    // -- Campaigns --
    pub campaigns: Vec<Campaign>,
    pub selected_campaign: Option<u64>,

    // -- Admin forms --
    pub withdraw_campaign: Option<u64>,
    pub withdraw_amount: String,
    pub new_campaign_name: String,
    pub new_campaign_description: String,
    pub new_campaign_target: String,

    // -- Ledger --
    pub donations: Vec<DonationRecord>,
    pub total_donated: U256,
    pub leaderboard: Vec<LeaderboardEntry>,
    pub ledger_loaded: bool,

    // -- Notices --
    pub error: Option<String>,
    pub notice: Option<String>,
    pub success: Option<String>,
    pub last_tx_hash: Option<String>,

    // -- Pending operation --
    pub loading: bool,
    pub pending_write: Option<WriteKind>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            screen: Screen::Donate,
            contract_address: None,
            account: None,
            owner: None,
            fiat_currency: "idr".to_string(),
            rate: None,
            fiat_input: String::new(),
            entry_mode: EntryMode::Fiat,
            converted_amount: String::new(),
            message_input: String::new(),
            campaigns: Vec::new(),
            selected_campaign: None,
            withdraw_campaign: None,
            withdraw_amount: String::new(),
            new_campaign_name: String::new(),
            new_campaign_description: String::new(),
            new_campaign_target: String::new(),
            donations: Vec::new(),
            total_donated: U256::ZERO,
            leaderboard: Vec::new(),
            ledger_loaded: false,
            error: None,
            notice: None,
            success: None,
            last_tx_hash: None,
            loading: false,
            pending_write: None,
        }
    }
}

impl AppState {
    /// Update the amount field and recompute the converted value.
    pub fn set_fiat_input(&mut self, input: impl Into<String>) {
        self.fiat_input = input.into();
        self.recompute_converted();
    }

    /// Update the exchange rate and recompute the converted value.
    pub fn set_rate(&mut self, rate: Option<ExchangeRate>) {
        self.rate = rate;
        self.recompute_converted();
    }

    pub fn set_entry_mode(&mut self, mode: EntryMode) {
        self.entry_mode = mode;
        self.recompute_converted();
    }

    pub fn recompute_converted(&mut self) {
        let price = self.rate.as_ref().map(|r| r.price);
        self.converted_amount = derive_amount(&self.fiat_input, self.entry_mode, price);
    }

    /// The selected campaign, if it is loaded.
    pub fn selected(&self) -> Option<&Campaign> {
        let id = self.selected_campaign?;
        self.campaigns.iter().find(|c| c.id == id)
    }

    /// Whether the connected account is the contract owner.
    pub fn is_owner(&self) -> bool {
        matches!((self.account, self.owner), (Some(a), Some(o)) if a == o)
    }

    /// Whether the donate button is enabled.
    pub fn can_submit(&self) -> bool {
        if self.loading {
            return false;
        }
        if self.entry_mode == EntryMode::Fiat && parse_positive_decimal(&self.fiat_input).is_none()
        {
            return false;
        }
        if validate_amount(&self.converted_amount).is_err() {
            return false;
        }
        // A closed campaign no longer accepts donations
        self.selected().map_or(true, |c| c.active)
    }

    /// Start a donation. Returns the request to send, or `None` when a write
    /// is already pending or the form is invalid (an inline notice is set).
    pub fn begin_submit(&mut self) -> Option<WriteRequest> {
        if self.loading {
            return None;
        }
        if self.entry_mode == EntryMode::Fiat && parse_positive_decimal(&self.fiat_input).is_none()
        {
            self.error = Some("Enter an amount greater than zero".to_string());
            return None;
        }
        if let Some(campaign) = self.selected() {
            if !campaign.active {
                self.error = Some(format!("Campaign \"{}\" is closed", campaign.name));
                return None;
            }
        }
        // The general fund has no message slot on-chain
        let message = match self.selected_campaign {
            Some(_) => self.message_input.clone(),
            None => String::new(),
        };
        let request = WriteRequest::Donate {
            amount: self.converted_amount.clone(),
            campaign: self.selected_campaign,
            message,
        };
        self.start(request)
    }

    /// Start a withdrawal from the campaign picked in the admin panel.
    pub fn begin_withdraw(&mut self) -> Option<WriteRequest> {
        if self.loading {
            return None;
        }
        let Some(campaign) = self.withdraw_campaign else {
            self.error = Some("Select a campaign to withdraw from".to_string());
            return None;
        };
        self.start(WriteRequest::Withdraw {
            campaign,
            amount: self.withdraw_amount.trim().to_string(),
        })
    }

    pub fn begin_create_campaign(&mut self) -> Option<WriteRequest> {
        if self.loading {
            return None;
        }
        self.start(WriteRequest::CreateCampaign {
            name: self.new_campaign_name.clone(),
            description: self.new_campaign_description.clone(),
            target: self.new_campaign_target.trim().to_string(),
        })
    }

    fn start(&mut self, request: WriteRequest) -> Option<WriteRequest> {
        if let Err(e) = request.validate() {
            self.error = Some(e.to_string());
            return None;
        }
        self.loading = true;
        self.pending_write = Some(request.kind());
        self.error = None;
        self.success = None;
        Some(request)
    }

    /// Change the campaign filter. The ledger reloads asynchronously; results
    /// for the previous filter are ignored when they arrive.
    pub fn select_campaign(&mut self, campaign: Option<u64>) -> bool {
        if self.selected_campaign == campaign {
            return false;
        }
        self.selected_campaign = campaign;
        self.ledger_loaded = false;
        true
    }

    /// Apply a service event to the state.
    pub fn apply(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::RateUpdated(rate) => {
                self.set_rate(Some(rate));
            }

            ServiceEvent::RateUnavailable(msg) => {
                self.set_rate(None);
                self.notice = Some(msg);
            }

            ServiceEvent::AccountConnected(account) => {
                self.account = Some(account);
                self.error = None;
            }

            ServiceEvent::OwnerLoaded(owner) => {
                self.owner = Some(owner);
            }

            ServiceEvent::CampaignsLoaded {
                campaigns,
                selected,
            } => {
                if self.withdraw_campaign.is_none() {
                    self.withdraw_campaign = campaigns.first().map(|c| c.id);
                }
                // The user's own pick wins unless it no longer exists; a
                // queued SelectCampaign brings the service back in line
                let first_load = self.campaigns.is_empty();
                let current_gone = self
                    .selected_campaign
                    .is_some_and(|id| !campaigns.iter().any(|c| c.id == id));
                self.campaigns = campaigns;
                if first_load || current_gone {
                    self.select_campaign(selected);
                }
            }

            ServiceEvent::LedgerLoaded { campaign, snapshot } => {
                if campaign != self.selected_campaign {
                    log::debug!("Ignoring stale ledger for campaign {:?}", campaign);
                    return;
                }
                self.donations = snapshot.donations;
                self.total_donated = snapshot.total;
                self.leaderboard = snapshot.leaderboard;
                self.ledger_loaded = true;
            }

            ServiceEvent::ReadFailed(msg) => {
                // Keep whatever was loaded before
                self.ledger_loaded = true;
                self.notice = Some(msg);
            }

            ServiceEvent::WriteSucceeded {
                kind,
                from,
                tx_hash,
            } => {
                self.loading = false;
                self.pending_write = None;
                self.account = Some(from);
                self.error = None;
                self.success = Some(format!("{} confirmed", kind.label()));
                self.last_tx_hash = Some(tx_hash);
                match kind {
                    WriteKind::Donate => {
                        self.fiat_input.clear();
                        self.message_input.clear();
                        self.converted_amount.clear();
                    }
                    WriteKind::Withdraw => self.withdraw_amount.clear(),
                    WriteKind::CreateCampaign => {
                        self.new_campaign_name.clear();
                        self.new_campaign_description.clear();
                        self.new_campaign_target.clear();
                    }
                }
            }

            ServiceEvent::WriteFailed(err) => {
                // Form inputs stay as typed so the user can retry
                self.loading = false;
                self.pending_write = None;
                self.success = None;
                self.error = Some(err.to_string());
            }

            ServiceEvent::Error(msg) => {
                self.loading = false;
                self.pending_write = None;
                self.error = Some(msg);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donation::{LedgerSnapshot, WriteError};

    fn addr(last: u8) -> Address {
        Address::with_last_byte(last)
    }

    fn campaign(id: u64, active: bool) -> Campaign {
        Campaign {
            id,
            name: format!("Campaign {}", id),
            description: String::new(),
            target: U256::from(1_000u64),
            total_donated: U256::ZERO,
            active,
        }
    }

    fn snapshot(total: u64) -> LedgerSnapshot {
        LedgerSnapshot {
            donations: Vec::new(),
            total: U256::from(total),
            leaderboard: Vec::new(),
        }
    }

    fn with_rate(price: f64) -> AppState {
        let mut state = AppState::default();
        state.apply(ServiceEvent::RateUpdated(ExchangeRate {
            fiat: "idr".into(),
            price,
        }));
        state
    }

    #[test]
    fn test_default_state() {
        let state = AppState::default();
        assert_eq!(state.screen, Screen::Donate);
        assert!(!state.loading);
        assert!(!state.can_submit());
        assert!(state.converted_amount.is_empty());
    }

    #[test]
    fn test_conversion_follows_input_and_rate() {
        let mut state = with_rate(30_000_000.0);
        state.set_fiat_input("3000000");
        assert_eq!(state.converted_amount, "0.100000");
        assert!(state.can_submit());

        state.apply(ServiceEvent::RateUnavailable("price feed down".into()));
        assert!(state.converted_amount.is_empty());
        assert!(!state.can_submit());
        assert_eq!(state.notice.as_deref(), Some("price feed down"));
    }

    #[test]
    fn test_cannot_submit_invalid_amounts() {
        let mut state = with_rate(30_000_000.0);
        for input in ["", "abc", "0", "-10"] {
            state.set_fiat_input(input);
            assert!(!state.can_submit(), "input {:?}", input);
        }
        // Too small to survive six-decimal rounding
        state.set_fiat_input("1");
        assert_eq!(state.converted_amount, "0.000000");
        assert!(!state.can_submit());
    }

    #[test]
    fn test_native_entry_mode() {
        let mut state = AppState::default();
        state.set_entry_mode(EntryMode::Native);
        state.set_fiat_input("0.25");
        assert_eq!(state.converted_amount, "0.25");
        assert!(state.can_submit());
    }

    #[test]
    fn test_begin_submit_sets_loading_once() {
        let mut state = with_rate(30_000_000.0);
        state.set_fiat_input("3000000");
        state.message_input = "hi".into();

        let request = state.begin_submit().unwrap();
        assert_eq!(
            request,
            WriteRequest::Donate {
                amount: "0.100000".into(),
                campaign: None,
                message: String::new(),
            }
        );
        assert!(state.loading);
        assert!(!state.can_submit());
        // Second click while pending is rejected, not queued
        assert!(state.begin_submit().is_none());
    }

    #[test]
    fn test_closed_campaign_blocks_donation() {
        let mut state = with_rate(10.0);
        state.apply(ServiceEvent::CampaignsLoaded {
            campaigns: vec![campaign(0, false), campaign(1, true)],
            selected: Some(0),
        });
        state.set_fiat_input("10");
        assert!(!state.can_submit());
        assert!(state.begin_submit().is_none());
        assert!(state.error.is_some());
        assert!(!state.loading);

        state.select_campaign(Some(1));
        assert!(state.can_submit());
    }

    #[test]
    fn test_success_clears_form_and_loading() {
        let mut state = with_rate(30_000_000.0);
        state.set_fiat_input("3000000");
        state.message_input = "hi".into();
        state.begin_submit().unwrap();

        state.apply(ServiceEvent::WriteSucceeded {
            kind: WriteKind::Donate,
            from: addr(1),
            tx_hash: "0xabc".into(),
        });
        assert!(!state.loading);
        assert!(state.fiat_input.is_empty());
        assert!(state.message_input.is_empty());
        assert!(state.converted_amount.is_empty());
        assert_eq!(state.account, Some(addr(1)));
        assert!(state.success.is_some());
    }

    #[test]
    fn test_cancelled_keeps_form() {
        let mut state = with_rate(30_000_000.0);
        state.set_fiat_input("3000000");
        state.begin_submit().unwrap();

        state.apply(ServiceEvent::WriteFailed(WriteError::Cancelled));
        assert!(!state.loading);
        assert_eq!(state.fiat_input, "3000000");
        assert_eq!(state.converted_amount, "0.100000");
        assert_eq!(state.error.as_deref(), Some("Transaction cancelled in wallet"));
    }

    #[test]
    fn test_failed_write_message() {
        let mut state = AppState {
            loading: true,
            ..Default::default()
        };
        state.apply(ServiceEvent::WriteFailed(WriteError::Failed(
            "out of gas".into(),
        )));
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("Transaction failed: out of gas"));
    }

    #[test]
    fn test_stale_ledger_ignored() {
        let mut state = AppState::default();
        state.select_campaign(Some(2));

        state.apply(ServiceEvent::LedgerLoaded {
            campaign: Some(1),
            snapshot: snapshot(42),
        });
        assert!(!state.ledger_loaded);
        assert_eq!(state.total_donated, U256::ZERO);

        state.apply(ServiceEvent::LedgerLoaded {
            campaign: Some(2),
            snapshot: snapshot(42),
        });
        assert!(state.ledger_loaded);
        assert_eq!(state.total_donated, U256::from(42u64));
    }

    #[test]
    fn test_campaign_reload_keeps_user_pick() {
        let mut state = AppState::default();
        state.apply(ServiceEvent::CampaignsLoaded {
            campaigns: vec![campaign(0, true), campaign(1, true)],
            selected: Some(0),
        });
        assert_eq!(state.selected_campaign, Some(0));

        // User clicks campaign 1 while a campaign refresh is in flight
        assert!(state.select_campaign(Some(1)));
        state.apply(ServiceEvent::CampaignsLoaded {
            campaigns: vec![campaign(0, true), campaign(1, true)],
            selected: Some(0),
        });
        assert_eq!(state.selected_campaign, Some(1));

        // The queued SelectCampaign(1) answers with the matching ledger
        state.apply(ServiceEvent::LedgerLoaded {
            campaign: Some(1),
            snapshot: snapshot(5),
        });
        assert!(state.ledger_loaded);
        assert_eq!(state.total_donated, U256::from(5u64));
    }

    #[test]
    fn test_campaign_reload_replaces_vanished_pick() {
        let mut state = AppState::default();
        state.apply(ServiceEvent::CampaignsLoaded {
            campaigns: vec![campaign(0, true), campaign(3, true)],
            selected: Some(0),
        });
        state.select_campaign(Some(3));
        state.apply(ServiceEvent::CampaignsLoaded {
            campaigns: vec![campaign(0, true)],
            selected: Some(0),
        });
        assert_eq!(state.selected_campaign, Some(0));
    }

    #[test]
    fn test_message_only_sent_with_campaign() {
        let mut state = with_rate(10.0);
        state.apply(ServiceEvent::CampaignsLoaded {
            campaigns: vec![campaign(0, true)],
            selected: Some(0),
        });
        state.set_fiat_input("10");
        state.message_input = "for the roof".into();
        match state.begin_submit() {
            Some(WriteRequest::Donate { message, campaign, .. }) => {
                assert_eq!(campaign, Some(0));
                assert_eq!(message, "for the roof");
            }
            other => panic!("unexpected request {:?}", other),
        }

        state.apply(ServiceEvent::WriteFailed(WriteError::Cancelled));
        state.select_campaign(None);
        match state.begin_submit() {
            Some(WriteRequest::Donate { message, campaign, .. }) => {
                assert_eq!(campaign, None);
                assert!(message.is_empty());
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_owner_detection() {
        let mut state = AppState::default();
        state.apply(ServiceEvent::OwnerLoaded(addr(9)));
        assert!(!state.is_owner());
        state.apply(ServiceEvent::AccountConnected(addr(1)));
        assert!(!state.is_owner());
        state.apply(ServiceEvent::AccountConnected(addr(9)));
        assert!(state.is_owner());
    }

    #[test]
    fn test_admin_forms_validate() {
        let mut state = AppState::default();
        assert!(state.begin_withdraw().is_none());
        assert!(state.error.is_some());

        state.new_campaign_target = "5".into();
        assert!(state.begin_create_campaign().is_none());
        assert_eq!(state.error.as_deref(), Some("Campaign name is required"));

        state.new_campaign_name = "Roof repair".into();
        let request = state.begin_create_campaign().unwrap();
        assert_eq!(request.kind(), WriteKind::CreateCampaign);
        assert!(state.loading);
    }

    #[test]
    fn test_apply_error() {
        let mut state = AppState {
            loading: true,
            ..Default::default()
        };
        state.apply(ServiceEvent::Error("connection failed".to_string()));
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("connection failed"));
    }
}
