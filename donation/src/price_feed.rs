//! Fiat price feed.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::types::ExchangeRate;

pub const DEFAULT_PRICE_FEED_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

/// Source of the native currency's fiat price.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch_rate(&self) -> Result<ExchangeRate, PriceFeedError>;
}

/// CoinGecko-style `simple/price` endpoint. One GET, no auth, no retry.
#[derive(Debug, Clone)]
pub struct CoinGeckoFeed {
    url: String,
    coin_id: String,
    fiat: String,
    client: Client,
}

impl CoinGeckoFeed {
    pub fn new(
        url: impl Into<String>,
        coin_id: impl Into<String>,
        fiat: impl Into<String>,
    ) -> Result<Self, PriceFeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            url: url.into(),
            coin_id: coin_id.into(),
            fiat: fiat.into().to_lowercase(),
            client,
        })
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoFeed {
    async fn fetch_rate(&self) -> Result<ExchangeRate, PriceFeedError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("ids", self.coin_id.as_str()),
                ("vs_currencies", self.fiat.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PriceFeedError::Http(response.status().as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        let price = body
            .get(&self.coin_id)
            .and_then(|coin| coin.get(&self.fiat))
            .and_then(|p| p.as_f64())
            .ok_or_else(|| PriceFeedError::MissingPrice {
                coin: self.coin_id.clone(),
                fiat: self.fiat.clone(),
            })?;

        if !price.is_finite() || price <= 0.0 {
            return Err(PriceFeedError::InvalidPrice(price));
        }

        log::info!("💱 1 {} = {} {}", self.coin_id, price, self.fiat.to_uppercase());
        Ok(ExchangeRate {
            fiat: self.fiat.clone(),
            price,
        })
    }
}

/// Feed that always returns the same rate. Used for offline runs and tests.
#[derive(Debug, Clone)]
pub struct FixedRateFeed {
    rate: Option<ExchangeRate>,
}

impl FixedRateFeed {
    pub fn new(fiat: &str, price: f64) -> Self {
        Self {
            rate: Some(ExchangeRate {
                fiat: fiat.to_lowercase(),
                price,
            }),
        }
    }

    /// A feed whose every fetch fails.
    pub fn unavailable() -> Self {
        Self { rate: None }
    }
}

#[async_trait]
impl PriceFeed for FixedRateFeed {
    async fn fetch_rate(&self) -> Result<ExchangeRate, PriceFeedError> {
        self.rate.clone().ok_or(PriceFeedError::Http(503))
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PriceFeedError {
    #[error("Price feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Price feed returned HTTP {0}")]
    Http(u16),

    #[error("No {fiat} price for {coin} in response")]
    MissingPrice { coin: String, fiat: String },

    #[error("Invalid price: {0}")]
    InvalidPrice(f64),
}
