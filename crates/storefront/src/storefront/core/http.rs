//! HTTP utilities
//!
//! One shared reqwest client for every store adapter, JSON decoding with
//! store-attributed errors, and a small freshness cache for large catalog
//! payloads that many resolutions share.

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{Result, Store, StoreError};
use crate::storefront::config::StoreConfig;

/// Cache entry for raw upstream bodies
#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    /// `None` when the window reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(body: String, ttl: Duration) -> Self {
        Self {
            body,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|expires_at| Instant::now() > expires_at)
    }
}

/// HTTP client shared by the store adapters
///
/// Cloning is cheap: the reqwest client and the response cache are both
/// reference counted.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    cache: Arc<Mutex<HashMap<String, CacheEntry>>>,
}

impl HttpClient {
    /// Create a new HTTP client from store configuration
    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| StoreError::Configuration {
                message: format!("Failed to create HTTP client: {}", e),
                field: None,
            })?;

        Ok(Self {
            client,
            cache: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.client.get(url)
    }

    /// Send a request and decode its JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        store: Store,
        request: RequestBuilder,
    ) -> Result<T> {
        let body = self.fetch_body(store, request).await?;
        decode(store, &body)
    }

    /// Like [`HttpClient::get_json`], but serves a stored body for up to `ttl`
    ///
    /// `cache_key` identifies the request; only successful bodies are stored.
    pub async fn get_json_cached<T: DeserializeOwned>(
        &self,
        store: Store,
        cache_key: &str,
        ttl: Duration,
        request: RequestBuilder,
    ) -> Result<T> {
        if let Some(body) = self.cached_body(cache_key) {
            debug!("Returning cached {} response for {}", store, cache_key);
            return decode(store, &body);
        }

        let body = self.fetch_body(store, request).await?;
        let value = decode(store, &body)?;

        if !ttl.is_zero() {
            self.store_body(cache_key, body, ttl);
        }

        Ok(value)
    }

    /// Lock the cache, recovering the map if a previous holder panicked
    fn lock_cache(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached_body(&self, cache_key: &str) -> Option<String> {
        let mut cache = self.lock_cache();
        match cache.get(cache_key) {
            Some(entry) if !entry.is_expired() => Some(entry.body.clone()),
            Some(_) => {
                debug!("Cached response for {} expired", cache_key);
                cache.remove(cache_key);
                None
            }
            None => None,
        }
    }

    fn store_body(&self, cache_key: &str, body: String, ttl: Duration) {
        let entry = CacheEntry::new(body, ttl);
        self.lock_cache().insert(cache_key.to_string(), entry);
    }

    /// Execute a request and return the body of a successful response
    async fn fetch_body(&self, store: Store, request: RequestBuilder) -> Result<String> {
        let (client, request) = request.build_split();
        let request = request.map_err(|e| StoreError::Configuration {
            message: format!("Invalid {} endpoint: {}", store, e),
            field: None,
        })?;
        let url = request.url().to_string();

        debug!("{} request: GET {}", store, url);
        let response = client
            .execute(request)
            .await
            .map_err(|e| StoreError::from_reqwest(store, &url, e))?;

        let status = response.status();
        debug!("{} response: {} for {}", store, status, url);

        if !status.is_success() {
            warn!("{} returned HTTP {} for {}", store, status, url);
            return Err(StoreError::UpstreamStatus {
                store,
                url,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| StoreError::from_reqwest(store, &url, e))
    }
}

fn decode<T: DeserializeOwned>(store: Store, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| StoreError::MalformedPayload {
        store,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> HttpClient {
        HttpClient::from_config(&StoreConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_maps_status_to_upstream_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let http = client();
        let url = format!("{}/broken", mock_server.uri());
        let result: Result<Value> = http.get_json(Store::Steam, http.get(&url)).await;

        match result {
            Err(StoreError::UpstreamStatus { status, store, .. }) => {
                assert_eq!(status, 503);
                assert_eq!(store, Store::Steam);
            }
            other => panic!("expected upstream status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_json_rejects_malformed_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&mock_server)
            .await;

        let http = client();
        let url = format!("{}/html", mock_server.uri());
        let result: Result<Value> = http.get_json(Store::Microsoft, http.get(&url)).await;

        assert!(matches!(
            result,
            Err(StoreError::MalformedPayload {
                store: Store::Microsoft,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_cached_body_served_without_second_request() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/catalog"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"n": 1}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let http = client();
        let url = format!("{}/catalog", mock_server.uri());
        let ttl = Duration::from_secs(60);

        let first: Value = http
            .get_json_cached(Store::Epic, &url, ttl, http.get(&url))
            .await
            .unwrap();
        let second: Value = http
            .get_json_cached(Store::Epic, &url, ttl, http.get(&url))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first["n"], 1);
    }

    #[tokio::test]
    async fn test_unbounded_ttl_caches_without_overflow() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/catalog"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"n": 1}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let http = client();
        let url = format!("{}/catalog", mock_server.uri());
        let ttl = Duration::from_secs(u64::MAX);

        for _ in 0..2 {
            let value: Value = http
                .get_json_cached(Store::Epic, &url, ttl, http.get(&url))
                .await
                .unwrap();
            assert_eq!(value["n"], 1);
        }
    }

    #[tokio::test]
    async fn test_invalid_endpoint_is_configuration_error() {
        let http = client();
        let result: Result<Value> = http
            .get_json(Store::Steam, http.get("not a url"))
            .await;

        assert!(matches!(result, Err(StoreError::Configuration { .. })));
    }

    #[tokio::test]
    async fn test_failed_responses_are_not_cached() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .expect(2)
            .mount(&mock_server)
            .await;

        let http = client();
        let url = format!("{}/flaky", mock_server.uri());
        let ttl = Duration::from_secs(60);

        for _ in 0..2 {
            let result: Result<Value> = http
                .get_json_cached(Store::Epic, &url, ttl, http.get(&url))
                .await;
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_cache_entry_expiry() {
        let fresh = CacheEntry::new("{}".to_string(), Duration::from_secs(3600));
        assert!(!fresh.is_expired());

        let stale = CacheEntry::new("{}".to_string(), Duration::from_nanos(1));
        std::thread::sleep(Duration::from_millis(2));
        assert!(stale.is_expired());

        let unbounded = CacheEntry::new("{}".to_string(), Duration::from_secs(u64::MAX));
        assert!(unbounded.expires_at.is_none());
        assert!(!unbounded.is_expired());
    }
}
