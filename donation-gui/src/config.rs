//! Client configuration
//!
//! The client only needs to know:
//! - Where the wallet provider listens
//! - Which contract to talk to
//! - Where to fetch the fiat price from

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use donation::price_feed::DEFAULT_PRICE_FEED_URL;
use donation::{parse_address, Address, ReceiptPolicy};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint of the wallet provider (e.g. Frame).
    #[serde(default = "default_provider_url")]
    pub provider_url: String,

    /// Deployed donation contract, `0x`-prefixed hex.
    #[serde(default)]
    pub contract_address: String,

    #[serde(default = "default_price_feed_url")]
    pub price_feed_url: String,

    /// Price feed id of the native coin.
    #[serde(default = "default_coin_id")]
    pub coin_id: String,

    /// Local fiat currency code, lowercase.
    #[serde(default = "default_fiat_currency")]
    pub fiat_currency: String,

    /// How long to wait for a write to be mined.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,

    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,
}

fn default_provider_url() -> String {
    "http://127.0.0.1:1248".to_string()
}

fn default_price_feed_url() -> String {
    DEFAULT_PRICE_FEED_URL.to_string()
}

fn default_coin_id() -> String {
    "ethereum".to_string()
}

fn default_fiat_currency() -> String {
    "idr".to_string()
}

fn default_confirmation_timeout_secs() -> u64 {
    300
}

fn default_receipt_poll_ms() -> u64 {
    2000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_url: default_provider_url(),
            contract_address: String::new(),
            price_feed_url: default_price_feed_url(),
            coin_id: default_coin_id(),
            fiat_currency: default_fiat_currency(),
            confirmation_timeout_secs: default_confirmation_timeout_secs(),
            receipt_poll_ms: default_receipt_poll_ms(),
        }
    }
}

impl Config {
    /// Load configuration from disk
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            log::info!("📁 Loading config from: {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)?;
            log::info!(
                "✅ Config loaded: provider={}, contract={}",
                config.provider_url,
                if config.contract_address.is_empty() {
                    "<unset>"
                } else {
                    &config.contract_address
                }
            );
            Ok(config)
        } else {
            log::info!("📝 Creating default config");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;
        log::info!("💾 Config saved to: {}", config_path.display());
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let mut path = Self::data_dir()?;
        path.push("config.toml");
        Ok(path)
    }

    /// Get base data directory
    pub fn data_dir() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        let mut path = home;
        path.push(".donation-desk");
        Ok(path)
    }

    /// Parsed contract address.
    pub fn contract(&self) -> Result<Address, ConfigError> {
        if self.contract_address.trim().is_empty() {
            return Err(ConfigError::MissingContract);
        }
        parse_address(&self.contract_address)
            .map_err(|_| ConfigError::InvalidContract(self.contract_address.clone()))
    }

    pub fn receipt_policy(&self) -> ReceiptPolicy {
        ReceiptPolicy {
            poll_interval: Duration::from_millis(self.receipt_poll_ms),
            timeout: Duration::from_secs(self.confirmation_timeout_secs),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.provider_url, &self.price_feed_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::InvalidEndpoint(url.clone()));
            }
        }

        self.contract()?;

        if self.coin_id.is_empty() || self.fiat_currency.is_empty() {
            return Err(ConfigError::InvalidCurrency);
        }

        if self.receipt_poll_ms == 0 || self.confirmation_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        Ok(())
    }
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Home directory not found")]
    NoHomeDir,

    #[error("Invalid endpoint: {0} (must start with http:// or https://)")]
    InvalidEndpoint(String),

    #[error("No contract address configured")]
    MissingContract,

    #[error("Invalid contract address: {0}")]
    InvalidContract(String),

    #[error("Coin id and fiat currency must be set")]
    InvalidCurrency,

    #[error("Receipt polling interval and timeout must be positive")]
    InvalidTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.provider_url, "http://127.0.0.1:1248");
        assert_eq!(config.fiat_currency, "idr");
        assert_eq!(config.confirmation_timeout_secs, 300);
        assert!(config.contract_address.is_empty());
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::MissingContract)));

        config.contract_address = CONTRACT.to_string();
        assert!(config.validate().is_ok());

        config.contract_address = "0x1234".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidContract(_))));

        config.contract_address = CONTRACT.to_string();
        config.provider_url = "127.0.0.1:1248".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidEndpoint(_))));

        config.provider_url = default_provider_url();
        config.receipt_poll_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTimeout)));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config =
            toml::from_str(&format!("contract_address = \"{}\"\nfiat_currency = \"usd\"", CONTRACT))
                .unwrap();
        assert_eq!(config.fiat_currency, "usd");
        assert_eq!(config.coin_id, "ethereum");
        assert_eq!(config.receipt_poll_ms, 2000);
        assert_eq!(config.contract().unwrap(), parse_address(CONTRACT).unwrap());
    }

    #[test]
    fn test_serialization() {
        let config = Config {
            contract_address: CONTRACT.to_string(),
            ..Config::default()
        };
        let toml = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&toml).unwrap();
        assert_eq!(config.contract_address, deserialized.contract_address);
        assert_eq!(config.price_feed_url, deserialized.price_feed_url);
    }

    #[test]
    fn test_receipt_policy() {
        let policy = Config::default().receipt_policy();
        assert_eq!(policy.poll_interval, Duration::from_millis(2000));
        assert_eq!(policy.timeout, Duration::from_secs(300));
    }
}
