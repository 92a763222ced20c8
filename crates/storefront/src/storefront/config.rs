//! Configuration types for the storefront resolver

use std::time::Duration;
use tracing::debug;

use crate::storefront::core::{Result, StoreError};

/// Upstream endpoints, locale/market and transport settings
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base of the Steam storefront API (`/api/appdetails` is appended)
    pub steam_api_base: String,
    /// Base of canonical Steam store URLs
    pub steam_store_base: String,
    /// Accept-Language sent to Steam
    pub steam_accept_language: String,
    /// Base of the Epic promotions backend (`/freeGamesPromotions` is appended)
    pub epic_api_base: String,
    /// Base of canonical Epic store URLs
    pub epic_store_base: String,
    /// User agent sent to Epic, which refuses obvious bots
    pub epic_user_agent: String,
    /// Freshness window for the shared Epic catalog response
    pub epic_catalog_ttl: Duration,
    /// Base of the Microsoft display catalog (`/v7.0/products` is appended)
    pub microsoft_api_base: String,
    /// Base of canonical Xbox store URLs
    pub microsoft_store_base: String,
    pub locale: String,
    pub country: String,
    pub market: String,
    pub language: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl StoreConfig {
    /// Load defaults, then apply `STOREFRONT_*` overrides from the environment
    ///
    /// A `.env` file in the working directory is honored when present.
    pub fn from_env() -> Result<Self> {
        if dotenv::dotenv().is_ok() {
            debug!("Loaded environment variables from .env file");
        }
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key/value lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let strings: [(&str, &mut String); 9] = [
            ("STOREFRONT_STEAM_API", &mut self.steam_api_base),
            ("STOREFRONT_EPIC_API", &mut self.epic_api_base),
            ("STOREFRONT_MICROSOFT_API", &mut self.microsoft_api_base),
            ("STOREFRONT_LOCALE", &mut self.locale),
            ("STOREFRONT_COUNTRY", &mut self.country),
            ("STOREFRONT_MARKET", &mut self.market),
            ("STOREFRONT_LANGUAGE", &mut self.language),
            ("STOREFRONT_USER_AGENT", &mut self.user_agent),
            ("STOREFRONT_EPIC_USER_AGENT", &mut self.epic_user_agent),
        ];
        for (key, field) in strings {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                debug!("Config override {}={}", key, value);
                *field = value.trim().trim_end_matches('/').to_string();
            }
        }

        if let Some(secs) = parse_secs(&lookup, "STOREFRONT_TIMEOUT_SECS")? {
            self.timeout = secs;
        }
        if let Some(secs) = parse_secs(&lookup, "STOREFRONT_EPIC_CACHE_SECS")? {
            self.epic_catalog_ttl = secs;
        }

        Ok(self)
    }

    pub fn with_steam_api_base<S: Into<String>>(mut self, base: S) -> Self {
        self.steam_api_base = base.into();
        self
    }

    pub fn with_epic_api_base<S: Into<String>>(mut self, base: S) -> Self {
        self.epic_api_base = base.into();
        self
    }

    pub fn with_microsoft_api_base<S: Into<String>>(mut self, base: S) -> Self {
        self.microsoft_api_base = base.into();
        self
    }

    pub fn with_epic_catalog_ttl(mut self, ttl: Duration) -> Self {
        self.epic_catalog_ttl = ttl;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Point every upstream API at one base URL, used against mock servers
    pub fn with_api_base<S: Into<String>>(self, base: S) -> Self {
        let base = base.into();
        self.with_steam_api_base(base.clone())
            .with_epic_api_base(base.clone())
            .with_microsoft_api_base(base)
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<u64>()
        .map(|secs| Some(Duration::from_secs(secs)))
        .map_err(|_| StoreError::Configuration {
            message: format!("{} must be a whole number of seconds, got '{}'", key, raw),
            field: Some(key.to_string()),
        })
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            steam_api_base: "https://store.steampowered.com".to_string(),
            steam_store_base: "https://store.steampowered.com".to_string(),
            steam_accept_language: "en-US,en;q=0.9".to_string(),
            epic_api_base: "https://store-site-backend-static-ipv4.ak.epicgames.com".to_string(),
            epic_store_base: "https://store.epicgames.com".to_string(),
            epic_user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36"
                .to_string(),
            epic_catalog_ttl: Duration::from_secs(3600), // 1 hour
            microsoft_api_base: "https://displaycatalog.mp.microsoft.com".to_string(),
            microsoft_store_base: "https://www.xbox.com".to_string(),
            locale: "en-US".to_string(),
            country: "US".to_string(),
            market: "US".to_string(),
            language: "en-us".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: "giftcard/0.1.0".to_string(),
        }
    }
}
