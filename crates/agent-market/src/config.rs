//! Configuration for market-data operations

use crate::cache::TtlPolicy;
use crate::error::{MarketError, Result};
use agent_utils::{EnvRequirement, optional_env, parse_env, required_env};
use std::time::Duration;

/// Default base URL of the financial data provider
pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com/api";

/// Version tag embedded in every cache key. Bump it to orphan every entry.
pub const DEFAULT_CACHE_VERSION: &str = "2026.10.1";

pub const FMP_API_KEY: &str = "FMP_API_KEY";
pub const SERPER_API_KEY: &str = "SERPER_API_KEY";

/// Variables reported by `market-agent check-env`
pub const ENV_REQUIREMENTS: &[EnvRequirement] = &[
    EnvRequirement {
        name: FMP_API_KEY,
        help: "https://site.financialmodelingprep.com/developer/docs/dashboard",
        required: true,
    },
    EnvRequirement {
        name: SERPER_API_KEY,
        help: "https://serper.dev/api-key",
        required: false,
    },
    EnvRequirement {
        name: "MARKET_CACHE_HOST",
        help: "Redis host, defaults to localhost",
        required: false,
    },
    EnvRequirement {
        name: "MARKET_CACHE_PORT",
        help: "Redis port, defaults to 6379",
        required: false,
    },
];

/// Key-value store settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// When false the no-op cache is used without trying to connect
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    /// Upper bound on connecting and the initial PING
    pub connect_timeout: Duration,
    /// Version tag embedded in every key
    pub version: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "localhost".to_string(),
            port: 6379,
            connect_timeout: Duration::from_secs(2),
            version: DEFAULT_CACHE_VERSION.to_string(),
        }
    }
}

impl CacheConfig {
    /// Read `MARKET_CACHE_*` variables over the defaults
    pub fn from_env() -> Result<Self> {
        let mut cache = Self::default();
        if let Some(host) = optional_env("MARKET_CACHE_HOST") {
            cache.host = host;
        }
        if let Some(port) = parse_env::<u16>("MARKET_CACHE_PORT")? {
            cache.port = port;
        }
        if let Some(version) = optional_env("MARKET_CACHE_VERSION") {
            cache.version = version;
        }
        if matches!(
            optional_env("MARKET_CACHE_DISABLED").as_deref(),
            Some("1" | "true" | "yes")
        ) {
            cache.enabled = false;
        }
        Ok(cache)
    }

    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

/// Configuration for market-data operations
#[derive(Clone)]
pub struct MarketConfig {
    /// Financial data API key (required)
    pub fmp_api_key: String,

    /// Base URL of the financial data API
    pub fmp_base_url: String,

    /// Web search API key (optional, enables the `web_search` tool)
    pub serper_api_key: Option<String>,

    /// Request timeout duration
    pub request_timeout: Duration,

    /// Maximum requests per minute, unlimited when `None`
    pub rate_limit_per_minute: Option<u32>,

    pub cache: CacheConfig,

    pub ttl: TtlPolicy,
}

impl std::fmt::Debug for MarketConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketConfig")
            .field("fmp_api_key", &"<redacted>")
            .field("fmp_base_url", &self.fmp_base_url)
            .field("serper_api_key", &self.serper_api_key.as_ref().map(|_| "<redacted>"))
            .field("request_timeout", &self.request_timeout)
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("cache", &self.cache)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            fmp_api_key: String::new(),
            fmp_base_url: DEFAULT_FMP_BASE_URL.to_string(),
            serper_api_key: None,
            request_timeout: Duration::from_secs(30),
            rate_limit_per_minute: None,
            cache: CacheConfig::default(),
            ttl: TtlPolicy::default(),
        }
    }
}

impl MarketConfig {
    /// Create a new configuration builder
    pub fn builder() -> MarketConfigBuilder {
        MarketConfigBuilder::default()
    }

    /// Load configuration from environment variables
    ///
    /// Fails when `FMP_API_KEY` is missing; every other variable is optional.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder().fmp_api_key(required_env(
            FMP_API_KEY,
            ENV_REQUIREMENTS[0].help,
        )?);

        if let Some(url) = optional_env("FMP_BASE_URL") {
            builder = builder.fmp_base_url(url);
        }
        if let Some(key) = optional_env(SERPER_API_KEY) {
            builder = builder.serper_api_key(key);
        }
        if let Some(secs) = parse_env::<u64>("MARKET_REQUEST_TIMEOUT_SECS")? {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(limit) = parse_env::<u32>("MARKET_RATE_LIMIT_PER_MINUTE")? {
            builder = builder.rate_limit_per_minute(limit);
        }

        builder.cache(CacheConfig::from_env()?).build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.fmp_api_key.trim().is_empty() {
            return Err(MarketError::ConfigError(format!(
                "{FMP_API_KEY} env variable not set!"
            )));
        }

        url::Url::parse(&self.fmp_base_url).map_err(|e| {
            MarketError::ConfigError(format!("invalid base URL {}: {e}", self.fmp_base_url))
        })?;

        if self.request_timeout.is_zero() {
            return Err(MarketError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit_per_minute == Some(0) {
            return Err(MarketError::ConfigError(
                "rate_limit_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.cache.version.contains(char::is_whitespace) || self.cache.version.is_empty() {
            return Err(MarketError::ConfigError(
                "cache version must be a non-empty tag without whitespace".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for MarketConfig
#[derive(Debug, Default)]
pub struct MarketConfigBuilder {
    fmp_api_key: Option<String>,
    fmp_base_url: Option<String>,
    serper_api_key: Option<String>,
    request_timeout: Option<Duration>,
    rate_limit_per_minute: Option<u32>,
    cache: Option<CacheConfig>,
    ttl: Option<TtlPolicy>,
}

impl MarketConfigBuilder {
    /// Set the financial data API key
    pub fn fmp_api_key(mut self, key: impl Into<String>) -> Self {
        self.fmp_api_key = Some(key.into());
        self
    }

    /// Point the client at another base URL
    pub fn fmp_base_url(mut self, url: impl Into<String>) -> Self {
        self.fmp_base_url = Some(url.into());
        self
    }

    /// Set the web search API key
    pub fn serper_api_key(mut self, key: impl Into<String>) -> Self {
        self.serper_api_key = Some(key.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = Some(limit);
        self
    }

    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache_version(mut self, version: impl Into<String>) -> Self {
        let mut cache = self.cache.take().unwrap_or_default();
        cache.version = version.into();
        self.cache = Some(cache);
        self
    }

    pub fn ttl(mut self, ttl: TtlPolicy) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<MarketConfig> {
        let defaults = MarketConfig::default();

        let config = MarketConfig {
            fmp_api_key: self.fmp_api_key.unwrap_or(defaults.fmp_api_key),
            fmp_base_url: self.fmp_base_url.unwrap_or(defaults.fmp_base_url),
            serper_api_key: self.serper_api_key,
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            rate_limit_per_minute: self.rate_limit_per_minute,
            cache: self.cache.unwrap_or(defaults.cache),
            ttl: self.ttl.unwrap_or(defaults.ttl),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_requires_api_key() {
        let config = MarketConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, MarketError::ConfigError(msg) if msg.contains(FMP_API_KEY)));
    }

    #[test]
    fn test_config_builder() {
        let config = MarketConfig::builder()
            .fmp_api_key("test_key")
            .request_timeout(Duration::from_secs(5))
            .rate_limit_per_minute(300)
            .cache_version("v2")
            .build()
            .unwrap();

        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.rate_limit_per_minute, Some(300));
        assert_eq!(config.cache.version, "v2");
        assert_eq!(config.fmp_base_url, DEFAULT_FMP_BASE_URL);
        assert!(config.serper_api_key.is_none());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(
            MarketConfig::builder()
                .fmp_api_key("k")
                .fmp_base_url("not a url")
                .build()
                .is_err()
        );
        assert!(
            MarketConfig::builder()
                .fmp_api_key("k")
                .rate_limit_per_minute(0)
                .build()
                .is_err()
        );
        assert!(
            MarketConfig::builder()
                .fmp_api_key("k")
                .cache_version("two words")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = MarketConfig::builder()
            .fmp_api_key("super-secret")
            .serper_api_key("also-secret")
            .build()
            .unwrap();
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(!printed.contains("also-secret"));
    }

    #[test]
    fn test_cache_url() {
        assert_eq!(CacheConfig::default().url(), "redis://localhost:6379/");
    }
}
