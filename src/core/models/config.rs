use crate::core::models::bidder::BidderInfo;
use crate::core::models::publisher::PublisherIdentity;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[builder(setter(into), default)]
pub struct BidderConfigEntry {
    pub bidder: BidderInfo,
    pub endpoint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "default_cache_ttl", with = "humantime_serde")]
    pub cache_ttl: Duration,
    #[serde(default = "default_cache_cap")]
    pub cache_capacity: usize,
}

fn default_cache_ttl() -> Duration {
    Duration::from_secs(30)
}

fn default_cache_cap() -> usize {
    1000
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            cache_ttl: default_cache_ttl(),
            cache_capacity: default_cache_cap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default = "default_rates_url")]
    pub rates_url: String,
    #[serde(default = "default_refresh_interval", with = "humantime_serde")]
    pub refresh_interval: Duration,
    #[serde(default = "default_stale_threshold", with = "humantime_serde")]
    pub stale_threshold: Duration,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_rates_url() -> String {
    "https://example.invalid/rates.json".to_string()
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(30 * 60)
}

fn default_stale_threshold() -> Duration {
    Duration::from_secs(24 * 60 * 60)
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_currency: default_currency(),
            rates_url: default_rates_url(),
            refresh_interval: default_refresh_interval(),
            stale_threshold: default_stale_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_cooldown", with = "humantime_serde")]
    pub cooldown: Duration,
    #[serde(default = "default_bad_request_is_failure")]
    pub bad_request_counts_as_failure: bool,
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_cooldown() -> Duration {
    Duration::from_secs(30)
}

fn default_bad_request_is_failure() -> bool {
    true
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            cooldown: default_cooldown(),
            bad_request_counts_as_failure: default_bad_request_is_failure(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionConfig {
    #[serde(default = "default_server_max_timeout", with = "humantime_serde")]
    pub server_max_timeout: Duration,
    #[serde(default = "default_safety_margin", with = "humantime_serde")]
    pub safety_margin: Duration,
    #[serde(default = "default_gdpr_enforced")]
    pub gdpr_enforcement_enabled: bool,
}

fn default_server_max_timeout() -> Duration {
    Duration::from_millis(1000)
}

fn default_safety_margin() -> Duration {
    Duration::from_millis(30)
}

fn default_gdpr_enforced() -> bool {
    true
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            server_max_timeout: default_server_max_timeout(),
            safety_margin: default_safety_margin(),
            gdpr_enforcement_enabled: default_gdpr_enforced(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalyticsConfig {
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

fn default_buffer_size() -> usize {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, Builder)]
#[builder(setter(into), default)]
pub struct ExchangeConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    pub bidders: Vec<BidderConfigEntry>,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub circuit_breaker: CircuitBreakerConfig,
    #[serde(default)]
    pub auction: AuctionConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Pre-shared admin API key. `None` means the admin gate allows all
    /// requests through with a startup warning (dev-only per §4.8).
    pub admin_api_key: Option<String>,
    /// Static last-resort allow-list (§4.4 fallback step 4), consulted
    /// only once every upstream publisher-identity lookup has failed.
    #[serde(default)]
    pub registered_publishers: Vec<PublisherIdentity>,
}

impl ExchangeConfig {
    pub fn load(path: &PathBuf) -> Result<ExchangeConfig, anyhow::Error> {
        let cfg = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()))
            .build()?;

        let mut exchange_config: ExchangeConfig = cfg.try_deserialize()?;
        exchange_config.apply_env_overrides();

        Ok(exchange_config)
    }

    /// Applies the narrow set of env-var overrides from §6.6. These are
    /// deliberately not wired through the `config` crate's environment
    /// source since their names don't nest under the YAML shape above.
    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT")
            && let Ok(parsed) = port.parse()
        {
            self.port = parsed;
        }

        if let Ok(cur) = std::env::var("DEFAULT_CURRENCY") {
            self.currency.default_currency = cur;
        }

        if let Ok(enabled) = std::env::var("CURRENCY_CONVERSION_ENABLED") {
            self.currency.enabled = enabled.eq_ignore_ascii_case("true");
        }

        if let Ok(disable_gdpr) = std::env::var("DISABLE_GDPR_ENFORCEMENT") {
            self.auction.gdpr_enforcement_enabled = !disable_gdpr.eq_ignore_ascii_case("true");
        }

        if let Ok(key) = std::env::var("ADMIN_API_KEY") {
            self.admin_api_key = Some(key);
        }
    }
}

fn default_port() -> u16 {
    8080
}
