//! Background service task — single `select!` loop, no spawns, no sleeps.
//!
//! The service owns all async I/O. It receives [`UiEvent`]s from the UI thread,
//! calls the contract and price feed, and sends [`ServiceEvent`]s back. Events
//! are handled one at a time, so reads and writes never interleave.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use donation::{
    default_campaign, dispatch, fetch_campaigns, load_ledger, CoinGeckoFeed, ContractClient,
    ContractError, DonationContract, FixedRateFeed, LedgerError, PriceFeed, RpcProvider,
    WriteError, WriteRequest,
};

use crate::config::Config;
use crate::events::{Screen, ServiceEvent, UiEvent};

/// Run the service loop until the cancellation token fires.
///
/// This is the **only** `tokio::spawn`ed task in the application. It owns the
/// contract client and the price feed.
pub async fn run(
    token: CancellationToken,
    mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    config: Config,
) {
    let feed: Box<dyn PriceFeed> = match CoinGeckoFeed::new(
        config.price_feed_url.clone(),
        config.coin_id.clone(),
        config.fiat_currency.clone(),
    ) {
        Ok(feed) => Box::new(feed),
        Err(e) => {
            log::warn!("Price feed disabled: {}", e);
            Box::new(FixedRateFeed::unavailable())
        }
    };

    let contract: Option<Box<dyn DonationContract>> = match connect_contract(&config) {
        Ok(client) => {
            log::info!(
                "🔗 Contract {} via {}",
                client.address(),
                config.provider_url
            );
            Some(Box::new(client))
        }
        Err(msg) => {
            log::warn!("{}", msg);
            let _ = svc_tx.send(ServiceEvent::Error(msg));
            None
        }
    };

    let mut state = ServiceState::new(svc_tx, contract, feed);
    state.refresh_all().await;

    log::info!("🚀 Service loop started");

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                log::info!("🛑 Service loop shutting down");
                break;
            }

            event = ui_rx.recv() => {
                let Some(event) = event else { break };
                if !state.handle(event).await {
                    break;
                }
            }
        }
    }
}

fn connect_contract(config: &Config) -> Result<ContractClient, String> {
    let address = config
        .contract()
        .map_err(|e| format!("Contract unavailable: {}", e))?;
    let provider = RpcProvider::new(config.provider_url.clone(), config.receipt_policy())
        .map_err(|e| format!("Wallet provider unavailable: {}", e))?;
    Ok(ContractClient::new(provider, address))
}

/// Mutable state owned by the service loop.
struct ServiceState {
    svc_tx: mpsc::UnboundedSender<ServiceEvent>,
    contract: Option<Box<dyn DonationContract>>,
    feed: Box<dyn PriceFeed>,
    /// Campaign filter the ledger is loaded for.
    selected: Option<u64>,
    campaigns_loaded: bool,
}

impl ServiceState {
    fn new(
        svc_tx: mpsc::UnboundedSender<ServiceEvent>,
        contract: Option<Box<dyn DonationContract>>,
        feed: Box<dyn PriceFeed>,
    ) -> Self {
        Self {
            svc_tx,
            contract,
            feed,
            selected: None,
            campaigns_loaded: false,
        }
    }

    fn send(&self, event: ServiceEvent) {
        let _ = self.svc_tx.send(event);
    }

    /// Handle one UI event. Returns `false` when the loop should stop.
    async fn handle(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::Shutdown => return false,

            UiEvent::ConnectWallet => self.connect_wallet().await,

            UiEvent::Refresh => self.refresh_all().await,

            UiEvent::SelectCampaign(campaign) => {
                self.selected = campaign;
                self.refresh_ledger().await;
            }

            UiEvent::Submit(request) => self.submit(request).await,

            UiEvent::NavigatedTo(Screen::Campaigns) => {
                let before = self.selected;
                self.refresh_campaigns().await;
                if self.selected != before {
                    self.refresh_ledger().await;
                }
            }

            UiEvent::NavigatedTo(screen) => {
                log::debug!("Navigated to {:?}", screen);
            }
        }
        true
    }

    async fn refresh_all(&mut self) {
        self.refresh_rate().await;
        self.refresh_owner().await;
        self.refresh_campaigns().await;
        self.refresh_ledger().await;
    }

    async fn refresh_rate(&self) {
        match self.feed.fetch_rate().await {
            Ok(rate) => self.send(ServiceEvent::RateUpdated(rate)),
            Err(e) => {
                log::warn!("Exchange rate fetch failed: {}", e);
                self.send(ServiceEvent::RateUnavailable(format!(
                    "Exchange rate unavailable: {}",
                    e
                )));
            }
        }
    }

    async fn refresh_owner(&self) {
        let Some(contract) = self.contract.as_deref() else {
            return;
        };
        match contract.owner().await {
            Ok(owner) => self.send(ServiceEvent::OwnerLoaded(owner)),
            // Contracts without an owner getter have no admin features
            Err(e @ ContractError::EmptyReturn(_)) => log::warn!("Owner unavailable: {}", e),
            Err(e) => {
                log::warn!("Owner read failed: {}", e);
                self.send(ServiceEvent::ReadFailed(format!(
                    "Could not load contract owner: {}",
                    e
                )));
            }
        }
    }

    async fn refresh_campaigns(&mut self) {
        let result = match self.contract.as_deref() {
            Some(contract) => fetch_campaigns(contract).await,
            None => return,
        };
        let campaigns = match result {
            Ok(campaigns) => campaigns,
            // Legacy contracts have no campaign getters
            Err(
                e @ LedgerError::Read {
                    source: ContractError::EmptyReturn(_),
                    ..
                },
            ) => {
                log::warn!("Campaigns unavailable: {}", e);
                return;
            }
            Err(e) => {
                log::warn!("Campaign load failed: {}", e);
                self.send(ServiceEvent::ReadFailed(format!(
                    "Could not load campaigns: {}",
                    e
                )));
                return;
            }
        };

        // First load picks a campaign; afterwards "all donations" stays put
        let selected = if !self.campaigns_loaded || self.selected.is_some() {
            default_campaign(&campaigns, self.selected)
        } else {
            None
        };
        self.campaigns_loaded = true;
        self.selected = selected;
        self.send(ServiceEvent::CampaignsLoaded {
            campaigns,
            selected,
        });
    }

    async fn refresh_ledger(&self) {
        let Some(contract) = self.contract.as_deref() else {
            self.send(ServiceEvent::ReadFailed(
                "No contract configured; donations cannot be loaded".to_string(),
            ));
            return;
        };
        match load_ledger(contract, self.selected).await {
            Ok(snapshot) => self.send(ServiceEvent::LedgerLoaded {
                campaign: self.selected,
                snapshot,
            }),
            Err(e) => {
                log::warn!("Ledger load failed: {}", e);
                self.send(ServiceEvent::ReadFailed(format!(
                    "Could not load donations: {}",
                    e
                )));
            }
        }
    }

    async fn connect_wallet(&self) {
        let Some(contract) = self.contract.as_deref() else {
            self.send(ServiceEvent::Error("No contract configured".to_string()));
            return;
        };
        match contract.request_accounts().await {
            Ok(account) => {
                log::info!("👛 Wallet connected: {}", account);
                self.send(ServiceEvent::AccountConnected(account));
            }
            Err(e) if e.is_user_rejection() => {
                self.send(ServiceEvent::Error("Wallet connection cancelled".to_string()));
            }
            Err(e) => {
                log::warn!("Wallet connection failed: {}", e);
                self.send(ServiceEvent::Error(format!("Wallet connection failed: {}", e)));
            }
        }
    }

    async fn submit(&mut self, request: WriteRequest) {
        let result = match self.contract.as_deref() {
            Some(contract) => dispatch(contract, &request).await,
            None => Err(WriteError::Failed("no contract configured".to_string())),
        };
        match result {
            Ok(outcome) => {
                self.send(ServiceEvent::WriteSucceeded {
                    kind: outcome.kind,
                    from: outcome.from,
                    tx_hash: outcome.tx_hash,
                });
                // Totals changed on chain; reload what depends on them
                self.refresh_campaigns().await;
                self.refresh_ledger().await;
            }
            Err(e) => self.send(ServiceEvent::WriteFailed(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use donation::{Address, MockContract, WriteKind, U256};

    fn addr(last: u8) -> Address {
        Address::with_last_byte(last)
    }

    fn wei(v: u64) -> U256 {
        U256::from(v)
    }

    fn service(
        contract: Option<MockContract>,
    ) -> (ServiceState, mpsc::UnboundedReceiver<ServiceEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let contract = contract.map(|c| Box::new(c) as Box<dyn DonationContract>);
        let feed = Box::new(FixedRateFeed::new("idr", 30_000_000.0));
        (ServiceState::new(tx, contract, feed), rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServiceEvent>) -> Vec<ServiceEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_refresh_all_loads_everything() {
        let mock = MockContract::new(addr(9), addr(1));
        mock.push_campaign("closed", wei(10), false);
        let open = mock.push_campaign("open", wei(10), true);
        mock.push_donation(addr(2), wei(7), Some(open));

        let (mut svc, mut rx) = service(Some(mock));
        svc.refresh_all().await;
        let events = drain(&mut rx);

        assert!(matches!(events[0], ServiceEvent::RateUpdated(ref r) if r.price == 30_000_000.0));
        assert!(matches!(events[1], ServiceEvent::OwnerLoaded(o) if o == addr(9)));
        match &events[2] {
            ServiceEvent::CampaignsLoaded {
                campaigns,
                selected,
            } => {
                assert_eq!(campaigns.len(), 2);
                assert_eq!(*selected, Some(open));
            }
            other => panic!("unexpected event {:?}", other),
        }
        match &events[3] {
            ServiceEvent::LedgerLoaded { campaign, snapshot } => {
                assert_eq!(*campaign, Some(open));
                assert_eq!(snapshot.total, wei(7));
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rate_failure_is_a_notice() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let svc = ServiceState::new(tx, None, Box::new(FixedRateFeed::unavailable()));
        svc.refresh_rate().await;
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ServiceEvent::RateUnavailable(_)]
        ));
    }

    #[tokio::test]
    async fn test_read_failure_is_a_notice() {
        let mock = MockContract::new(addr(9), addr(1));
        mock.set_fail_reads(true);
        let (svc, mut rx) = service(Some(mock));
        svc.refresh_ledger().await;
        match drain(&mut rx).as_slice() {
            [ServiceEvent::ReadFailed(msg)] => assert!(msg.contains("donation count")),
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_campaign_read_failure_is_a_notice() {
        let mock = MockContract::new(addr(9), addr(1));
        mock.push_campaign("A", wei(10), true);
        mock.set_fail_reads(true);
        let (mut svc, mut rx) = service(Some(mock));
        svc.refresh_campaigns().await;
        match drain(&mut rx).as_slice() {
            [ServiceEvent::ReadFailed(msg)] => {
                assert!(msg.starts_with("Could not load campaigns"));
                assert!(msg.contains("campaign count"));
            }
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_owner_read_failure_is_a_notice() {
        let mock = MockContract::new(addr(9), addr(1));
        mock.set_fail_reads(true);
        let (svc, mut rx) = service(Some(mock));
        svc.refresh_owner().await;
        match drain(&mut rx).as_slice() {
            [ServiceEvent::ReadFailed(msg)] => assert!(msg.contains("503")),
            other => panic!("unexpected events {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_submit_donation_refreshes_ledger() {
        let (mut svc, mut rx) = service(Some(MockContract::new(addr(9), addr(1))));
        let keep_running = svc
            .handle(UiEvent::Submit(WriteRequest::Donate {
                amount: "0.100000".into(),
                campaign: None,
                message: String::new(),
            }))
            .await;
        assert!(keep_running);

        let events = drain(&mut rx);
        assert!(matches!(
            events[0],
            ServiceEvent::WriteSucceeded { kind: WriteKind::Donate, from, .. } if from == addr(1)
        ));
        let ledger = events.iter().find_map(|e| match e {
            ServiceEvent::LedgerLoaded { snapshot, .. } => Some(snapshot),
            _ => None,
        });
        assert_eq!(
            ledger.map(|s| s.total),
            Some(U256::from(100_000_000_000_000_000u64))
        );
    }

    #[tokio::test]
    async fn test_submit_rejected_in_wallet() {
        let mock = MockContract::new(addr(9), addr(1));
        mock.set_reject_writes(true);
        let (mut svc, mut rx) = service(Some(mock));
        svc.handle(UiEvent::Submit(WriteRequest::Donate {
            amount: "0.1".into(),
            campaign: None,
            message: String::new(),
        }))
        .await;

        // No ledger reload after a cancelled write
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ServiceEvent::WriteFailed(WriteError::Cancelled)]
        ));
    }

    #[tokio::test]
    async fn test_select_campaign_reloads_filtered() {
        let mock = MockContract::new(addr(9), addr(1));
        let a = mock.push_campaign("A", wei(10), true);
        let b = mock.push_campaign("B", wei(10), true);
        mock.push_donation(addr(2), wei(3), Some(a));
        mock.push_donation(addr(2), wei(4), Some(b));

        let (mut svc, mut rx) = service(Some(mock));
        svc.handle(UiEvent::SelectCampaign(Some(b))).await;
        svc.handle(UiEvent::SelectCampaign(None)).await;

        let totals: Vec<(Option<u64>, U256)> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                ServiceEvent::LedgerLoaded { campaign, snapshot } => {
                    Some((campaign, snapshot.total))
                }
                _ => None,
            })
            .collect();
        assert_eq!(totals, vec![(Some(b), wei(4)), (None, wei(7))]);
    }

    #[tokio::test]
    async fn test_connect_wallet() {
        let (mut svc, mut rx) = service(Some(MockContract::new(addr(9), addr(1))));
        svc.handle(UiEvent::ConnectWallet).await;
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ServiceEvent::AccountConnected(a)] if *a == addr(1)
        ));
    }

    #[tokio::test]
    async fn test_without_contract() {
        let (mut svc, mut rx) = service(None);
        svc.handle(UiEvent::Submit(WriteRequest::Donate {
            amount: "1".into(),
            campaign: None,
            message: String::new(),
        }))
        .await;
        assert!(matches!(
            drain(&mut rx).as_slice(),
            [ServiceEvent::WriteFailed(WriteError::Failed(_))]
        ));
        assert!(!svc.handle(UiEvent::Shutdown).await);
    }
}
